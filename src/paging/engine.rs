use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::domain::Identified;
use crate::paging::{
    Direction, LoadState, Page, PageKey, PageRequest, PageSource, PagingConfig,
    RefreshFailurePolicy, Snapshot,
};

/// Drives page loads for one feed and publishes the merged result.
///
/// Every operation returns immediately; fetches run as spawned Tokio tasks, so
/// the engine must be used from within a runtime. State changes are applied
/// under a mutex that is never held across an await, and each change
/// publishes a fresh [`Snapshot`].
///
/// Dropping the engine cancels every in-flight fetch.
pub struct PagingEngine<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    source: Arc<dyn PageSource<T>>,
    config: PagingConfig,
    state: Mutex<EngineState<T>>,
    snapshots: watch::Sender<Arc<Snapshot<T>>>,
}

#[derive(Default)]
struct Lane {
    state: LoadState,
    /// Request to reissue on retry.
    failed: Option<PageRequest>,
    task: Option<JoinHandle<()>>,
}

impl Lane {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Keys and load flag saved while a keep-stale refresh is in flight.
struct StaleKeys {
    prev_key: Option<PageKey>,
    next_key: Option<PageKey>,
    loaded: bool,
}

struct EngineState<T> {
    generation: u64,
    closed: bool,
    /// A first page has been applied since the last refresh started.
    loaded: bool,
    items: Vec<T>,
    ids: HashSet<String>,
    prev_key: Option<PageKey>,
    next_key: Option<PageKey>,
    refresh: Lane,
    append: Lane,
    prepend: Lane,
    stale: Option<StaleKeys>,
}

impl<T> EngineState<T> {
    fn new() -> Self {
        Self {
            generation: 0,
            closed: false,
            loaded: false,
            items: Vec::new(),
            ids: HashSet::new(),
            prev_key: None,
            next_key: None,
            refresh: Lane::default(),
            append: Lane::default(),
            prepend: Lane::default(),
            stale: None,
        }
    }

    fn lane(&self, direction: Direction) -> &Lane {
        match direction {
            Direction::Refresh => &self.refresh,
            Direction::Append => &self.append,
            Direction::Prepend => &self.prepend,
        }
    }

    fn lane_mut(&mut self, direction: Direction) -> &mut Lane {
        match direction {
            Direction::Refresh => &mut self.refresh,
            Direction::Append => &mut self.append,
            Direction::Prepend => &mut self.prepend,
        }
    }

    fn cancel_all(&mut self) {
        self.refresh.cancel();
        self.append.cancel();
        self.prepend.cancel();
    }

    /// Mark closed and abort every fetch. Aborted lanes go back to idle.
    fn shut_down(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        self.cancel_all();
        for lane in [&mut self.refresh, &mut self.append, &mut self.prepend] {
            if lane.state.is_loading() {
                lane.state = LoadState::Idle;
            }
        }
        true
    }
}

impl<T: Identified> EngineState<T> {
    fn apply_page(&mut self, direction: Direction, page: Page<T>) -> usize {
        let reached_edge = page.items.is_empty();
        let added = match direction {
            Direction::Refresh => {
                self.items.clear();
                self.ids.clear();
                self.loaded = true;
                self.stale = None;
                self.prev_key = page.prev_key;
                self.next_key = if reached_edge { None } else { page.next_key };
                self.push_back(page.items)
            }
            Direction::Append => {
                self.next_key = if reached_edge { None } else { page.next_key };
                self.push_back(page.items)
            }
            Direction::Prepend => {
                self.prev_key = if reached_edge { None } else { page.prev_key };
                self.push_front(page.items)
            }
        };

        let lane = self.lane_mut(direction);
        lane.state = LoadState::Idle;
        lane.failed = None;
        added
    }

    fn apply_error(&mut self, direction: Direction, request: PageRequest, error: ApiError) {
        if direction == Direction::Refresh {
            if let Some(stale) = self.stale.take() {
                self.prev_key = stale.prev_key;
                self.next_key = stale.next_key;
                self.loaded = stale.loaded;
            }
        }

        let lane = self.lane_mut(direction);
        lane.state = LoadState::Error(error);
        lane.failed = Some(request);
    }

    /// Items already present keep their position; duplicates are skipped.
    fn push_back(&mut self, items: Vec<T>) -> usize {
        let before = self.items.len();
        for item in items {
            if self.ids.insert(item.id().to_string()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    fn push_front(&mut self, items: Vec<T>) -> usize {
        let fresh: Vec<T> = items
            .into_iter()
            .filter(|item| self.ids.insert(item.id().to_string()))
            .collect();
        let added = fresh.len();
        self.items.splice(0..0, fresh);
        added
    }
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, EngineState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Shared<T>
where
    T: Identified + Clone + Send + Sync + 'static,
{
    fn publish(&self, state: &EngineState<T>) {
        let snapshot = Snapshot {
            items: state.items.clone(),
            refresh: state.refresh.state.clone(),
            append: state.append.state.clone(),
            prepend: state.prepend.state.clone(),
            generation: state.generation,
            end_reached: state.loaded && state.next_key.is_none(),
            start_reached: state.loaded && state.prev_key.is_none(),
        };
        self.snapshots.send_replace(Arc::new(snapshot));
    }

    fn launch(
        self: &Arc<Self>,
        state: &mut EngineState<T>,
        direction: Direction,
        request: PageRequest,
    ) {
        debug!(
            "Fetching {} page {} (size {}, generation {})",
            direction, request.key, request.size, state.generation
        );

        let generation = state.generation;
        let shared = Arc::clone(self);
        let task = tokio::spawn(async move {
            let result = shared.source.load(request).await;
            shared.apply(direction, generation, request, result);
        });

        let lane = state.lane_mut(direction);
        lane.state = LoadState::Loading;
        lane.failed = None;
        lane.task = Some(task);
    }

    fn start_refresh(self: &Arc<Self>, state: &mut EngineState<T>) {
        state.generation += 1;
        state.cancel_all();
        state.append = Lane::default();
        state.prepend = Lane::default();

        match self.config.refresh_failure {
            RefreshFailurePolicy::Clear => {
                state.items.clear();
                state.ids.clear();
                state.stale = None;
            }
            RefreshFailurePolicy::KeepStale => {
                if state.stale.is_none() {
                    state.stale = Some(StaleKeys {
                        prev_key: state.prev_key,
                        next_key: state.next_key,
                        loaded: state.loaded,
                    });
                }
            }
        }
        state.prev_key = None;
        state.next_key = None;
        state.loaded = false;

        let request = PageRequest::new(self.config.initial_key(), self.config.initial_load_size());
        self.launch(state, Direction::Refresh, request);
    }

    fn apply(
        &self,
        direction: Direction,
        generation: u64,
        request: PageRequest,
        result: Result<Page<T>, ApiError>,
    ) {
        let mut guard = self.lock();
        let state = &mut *guard;

        if state.closed || state.generation != generation {
            debug!(
                "Dropping stale {} result for page {} (generation {}, current {})",
                direction, request.key, generation, state.generation
            );
            return;
        }

        state.lane_mut(direction).task = None;
        match result {
            Ok(page) => {
                let added = state.apply_page(direction, page);
                debug!("Applied {} page {}: {} new items", direction, request.key, added);
                if direction == Direction::Refresh {
                    info!("Feed refreshed with {} items", state.items.len());
                }
            }
            Err(error) => {
                warn!("Loading {} page {} failed: {}", direction, request.key, error);
                state.apply_error(direction, request, error);
            }
        }

        self.publish(state);
    }
}

impl<T> PagingEngine<T>
where
    T: Identified + Clone + Send + Sync + 'static,
{
    pub fn new(source: Arc<dyn PageSource<T>>, config: PagingConfig) -> Self {
        let (snapshots, _) = watch::channel(Arc::new(Snapshot::default()));
        Self {
            shared: Arc::new(Shared {
                source,
                config,
                state: Mutex::new(EngineState::new()),
                snapshots,
            }),
        }
    }

    pub fn config(&self) -> &PagingConfig {
        &self.shared.config
    }

    pub fn snapshot(&self) -> Arc<Snapshot<T>> {
        self.shared.snapshots.borrow().clone()
    }

    /// Receiver that is notified after every committed change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot<T>>> {
        self.shared.snapshots.subscribe()
    }

    /// Wait for the first snapshot, current one included, matching `predicate`.
    pub async fn wait_until<F>(&self, mut predicate: F) -> Arc<Snapshot<T>>
    where
        F: FnMut(&Snapshot<T>) -> bool,
    {
        let mut rx = self.subscribe();
        let found = rx
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map(|snapshot| Arc::clone(&*snapshot));
        match found {
            Ok(snapshot) => snapshot,
            Err(_) => self.snapshot(),
        }
    }

    /// Load the first page.
    ///
    /// Does nothing while that load is in flight or once it has succeeded;
    /// after a failed first load it starts over.
    pub fn initialize(&self) -> bool {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        if state.closed || state.refresh.state.is_loading() || state.loaded {
            return false;
        }

        self.shared.start_refresh(state);
        self.shared.publish(state);
        true
    }

    /// Drop every loaded page and start again from the initial key.
    pub fn refresh(&self) {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        if state.closed {
            return;
        }

        debug!("Refresh requested (generation {})", state.generation + 1);
        self.shared.start_refresh(state);
        self.shared.publish(state);
    }

    /// Fetch the next page in `direction`.
    ///
    /// Ignored when that edge has been reached, when the direction is loading or
    /// failed, or while a refresh is loading. Refresh is not a load-more
    /// direction and is always ignored here.
    pub fn load_more(&self, direction: Direction) -> bool {
        let mut guard = self.shared.lock();
        let state = &mut *guard;

        let key = match direction {
            Direction::Refresh => return false,
            Direction::Append => state.next_key,
            Direction::Prepend => state.prev_key,
        };
        if state.closed
            || state.refresh.state.is_loading()
            || !state.lane(direction).state.is_idle()
        {
            return false;
        }
        let Some(key) = key else {
            return false;
        };

        let request = PageRequest::new(key, self.shared.config.page_size());
        self.shared.launch(state, direction, request);
        self.shared.publish(state);
        true
    }

    /// Reissue the last failed request in `direction` with the same key.
    pub fn retry(&self, direction: Direction) -> bool {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        if state.closed {
            return false;
        }

        let lane = state.lane(direction);
        let request = match (&lane.state, lane.failed) {
            (LoadState::Error(_), Some(request)) => request,
            _ => return false,
        };

        if direction == Direction::Refresh {
            self.shared.start_refresh(state);
        } else {
            self.shared.launch(state, direction, request);
        }
        self.shared.publish(state);
        true
    }

    /// End the session: abort in-flight fetches and ignore their outcomes.
    ///
    /// Publishes a final snapshot with nothing loading, so waiters settle.
    pub fn close(&self) {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        if state.shut_down() {
            self.shared.publish(state);
        }
    }
}

impl<T> Drop for PagingEngine<T> {
    fn drop(&mut self) {
        self.shared.lock().shut_down();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::testing::{ids, item, settle, Item, ScriptedSource};
    use std::time::Duration;

    fn engine(source: &Arc<ScriptedSource>) -> PagingEngine<Item> {
        PagingEngine::new(source.clone(), PagingConfig::with_page_size(2))
    }

    fn engine_with(source: &Arc<ScriptedSource>, config: PagingConfig) -> PagingEngine<Item> {
        PagingEngine::new(source.clone(), config)
    }

    async fn loaded(engine: &PagingEngine<Item>) -> Arc<Snapshot<Item>> {
        settle(engine, |s| s.refresh.is_idle() && s.generation > 0).await
    }

    #[tokio::test]
    async fn test_initialize_while_loading_fetches_once() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        let gate = source.gate(1);
        let engine = engine(&source);

        assert!(engine.initialize());
        assert!(!engine.initialize());
        assert!(engine.snapshot().refresh.is_loading());

        gate.notify_one();
        let snapshot = loaded(&engine).await;
        assert_eq!(ids(&snapshot), vec!["a", "b"]);

        assert!(!engine.initialize());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_pages_append_in_order() {
        let source = ScriptedSource::new();
        source.page(1, &["A", "B"]);
        source.page(2, &["C", "D"]);
        let engine = engine(&source);

        engine.initialize();
        loaded(&engine).await;
        assert!(engine.load_more(Direction::Append));
        let snapshot = settle(&engine, |s| s.append.is_idle() && s.len() == 4).await;

        assert_eq!(ids(&snapshot), vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_empty_page_ends_collection() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        source.page(2, &["c", "d"]);
        source.page(3, &[]);
        let engine = engine(&source);

        engine.initialize();
        loaded(&engine).await;
        engine.load_more(Direction::Append);
        settle(&engine, |s| s.append.is_idle() && s.len() == 4).await;
        engine.load_more(Direction::Append);
        let snapshot = settle(&engine, |s| s.end_reached).await;

        assert!(!engine.load_more(Direction::Append));
        assert!(engine.snapshot().append.is_idle());
        assert_eq!(snapshot.len(), 4);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let source = ScriptedSource::new();
        source.page(1, &[]);
        let engine = engine(&source);

        engine.initialize();
        let snapshot = loaded(&engine).await;

        assert!(snapshot.is_empty());
        assert!(snapshot.end_reached);
        assert!(snapshot.start_reached);
        assert!(!engine.load_more(Direction::Append));
    }

    #[tokio::test]
    async fn test_duplicate_ids_across_pages_are_dropped() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "x"]);
        source.page(2, &["x", "b"]);
        let engine = engine(&source);

        engine.initialize();
        loaded(&engine).await;
        engine.load_more(Direction::Append);
        let snapshot = settle(&engine, |s| s.append.is_idle() && s.len() == 3).await;

        assert_eq!(ids(&snapshot), vec!["a", "x", "b"]);
        assert_eq!(snapshot.items.iter().filter(|i| i.id == "x").count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_keeps_original_position() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        source.page(2, &["c", "a"]);
        let engine = engine(&source);

        engine.initialize();
        loaded(&engine).await;
        engine.load_more(Direction::Append);
        let snapshot = settle(&engine, |s| s.append.is_idle() && s.len() == 3).await;

        assert_eq!(ids(&snapshot), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_refresh_discards_in_flight_append() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        source.page(1, &["r1", "r2"]);
        source.page(2, &["stale1", "stale2"]);
        let gate = source.gate(2);
        let engine = engine(&source);

        engine.initialize();
        loaded(&engine).await;
        assert!(engine.load_more(Direction::Append));

        engine.refresh();
        let snapshot = settle(&engine, |s| s.refresh.is_idle() && s.generation == 2).await;
        assert_eq!(ids(&snapshot), vec!["r1", "r2"]);

        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let snapshot = engine.snapshot();
        assert_eq!(ids(&snapshot), vec!["r1", "r2"]);
        assert!(snapshot.append.is_idle());
    }

    #[tokio::test]
    async fn test_stale_generation_result_is_dropped() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        let engine = engine(&source);

        engine.initialize();
        loaded(&engine).await;
        engine.refresh();
        let before = loaded(&engine).await;

        let stale_page = Page {
            items: vec![item("old")],
            prev_key: Some(PageKey::new(1)),
            next_key: Some(PageKey::new(3)),
        };
        engine.shared.apply(
            Direction::Append,
            1,
            PageRequest::new(PageKey::new(2), 2),
            Ok(stale_page),
        );

        assert_eq!(engine.snapshot(), before);
    }

    #[tokio::test]
    async fn test_refresh_starts_empty() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        let gate = source.gate(1);
        let engine = engine(&source);

        engine.initialize();
        gate.notify_one();
        loaded(&engine).await;

        engine.refresh();
        let snapshot = engine.snapshot();
        assert!(snapshot.is_empty());
        assert!(snapshot.refresh.is_loading());
        assert!(!engine.load_more(Direction::Append));

        gate.notify_one();
        let snapshot = loaded(&engine).await;
        assert_eq!(ids(&snapshot), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failed_append_keeps_items_until_retry() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        source.fail(2, ApiError::Network("offline".into()));
        source.page(2, &["c", "d"]);
        let engine = engine(&source);

        engine.initialize();
        loaded(&engine).await;
        engine.load_more(Direction::Append);
        let snapshot = settle(&engine, |s| s.append.error().is_some()).await;

        assert_eq!(ids(&snapshot), vec!["a", "b"]);
        assert!(snapshot.refresh.is_idle());
        assert_eq!(
            snapshot.append,
            LoadState::Error(ApiError::Network("offline".into()))
        );

        assert!(!engine.load_more(Direction::Append));
        assert!(engine.retry(Direction::Append));
        let snapshot = settle(&engine, |s| s.append.is_idle() && s.len() == 4).await;

        assert_eq!(ids(&snapshot), vec!["a", "b", "c", "d"]);
        let keys: Vec<u32> = source.requests().iter().map(|r| r.key.get()).collect();
        assert_eq!(keys, vec![1, 2, 2]);
    }

    #[tokio::test]
    async fn test_retry_without_error_is_ignored() {
        let source = ScriptedSource::new();
        source.page(1, &["a"]);
        let engine = engine(&source);

        engine.initialize();
        loaded(&engine).await;

        assert!(!engine.retry(Direction::Append));
        assert!(!engine.retry(Direction::Refresh));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_back_to_back_load_more_fetches_once() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        source.page(2, &["c", "d"]);
        let gate = source.gate(2);
        let engine = engine(&source);

        engine.initialize();
        loaded(&engine).await;

        assert!(engine.load_more(Direction::Append));
        assert!(!engine.load_more(Direction::Append));

        gate.notify_one();
        settle(&engine, |s| s.append.is_idle() && s.len() == 4).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_refresh_failure_clears_items() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        source.fail(1, ApiError::Server {
            status: 500,
            message: "boom".into(),
        });
        let engine = engine(&source);

        engine.initialize();
        loaded(&engine).await;
        engine.refresh();
        let snapshot = settle(&engine, |s| s.refresh.error().is_some()).await;

        assert!(snapshot.is_empty());
        assert!(!snapshot.end_reached);
        assert!(!engine.load_more(Direction::Append));
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_stale_items_when_configured() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        source.fail(1, ApiError::Network("offline".into()));
        source.page(1, &["a", "b"]);
        source.page(2, &["c"]);
        let config = PagingConfig {
            refresh_failure: RefreshFailurePolicy::KeepStale,
            ..PagingConfig::with_page_size(2)
        };
        let engine = engine_with(&source, config);

        engine.initialize();
        loaded(&engine).await;
        engine.refresh();
        assert_eq!(ids(&engine.snapshot()), vec!["a", "b"]);

        let snapshot = settle(&engine, |s| s.refresh.error().is_some()).await;
        assert_eq!(ids(&snapshot), vec!["a", "b"]);

        assert!(engine.load_more(Direction::Append));
        let snapshot = settle(&engine, |s| s.append.is_idle() && s.len() == 3).await;
        assert_eq!(ids(&snapshot), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_initialize_after_failed_first_load_retries() {
        let source = ScriptedSource::new();
        source.fail(1, ApiError::Network("offline".into()));
        source.page(1, &["a"]);
        let engine = engine(&source);

        engine.initialize();
        settle(&engine, |s| s.refresh.error().is_some()).await;

        assert!(engine.initialize());
        let snapshot = loaded(&engine).await;
        assert_eq!(ids(&snapshot), vec!["a"]);
    }

    #[tokio::test]
    async fn test_retry_refresh_after_failure() {
        let source = ScriptedSource::new();
        source.fail(1, ApiError::Network("offline".into()));
        source.page(1, &["a"]);
        let engine = engine(&source);

        engine.initialize();
        settle(&engine, |s| s.refresh.error().is_some()).await;

        assert!(engine.retry(Direction::Refresh));
        let snapshot = loaded(&engine).await;
        assert_eq!(ids(&snapshot), vec!["a"]);
    }

    #[tokio::test]
    async fn test_prepend_from_middle_page() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        source.page(2, &["c", "d"]);
        source.page(3, &["e", "f"]);
        let config = PagingConfig {
            initial_key: 3,
            ..PagingConfig::with_page_size(2)
        };
        let engine = engine_with(&source, config);

        engine.initialize();
        let snapshot = loaded(&engine).await;
        assert!(!snapshot.start_reached);

        assert!(engine.load_more(Direction::Prepend));
        let snapshot = settle(&engine, |s| s.prepend.is_idle() && s.len() == 4).await;
        assert_eq!(ids(&snapshot), vec!["c", "d", "e", "f"]);

        assert!(engine.load_more(Direction::Prepend));
        let snapshot = settle(&engine, |s| s.prepend.is_idle() && s.len() == 6).await;
        assert_eq!(ids(&snapshot), vec!["a", "b", "c", "d", "e", "f"]);
        assert!(snapshot.start_reached);
        assert!(!engine.load_more(Direction::Prepend));
    }

    #[tokio::test]
    async fn test_prepend_skips_ids_already_loaded() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        source.page(2, &["b", "c"]);
        let config = PagingConfig {
            initial_key: 2,
            ..PagingConfig::with_page_size(2)
        };
        let engine = engine_with(&source, config);

        engine.initialize();
        loaded(&engine).await;

        assert!(engine.load_more(Direction::Prepend));
        let snapshot = settle(&engine, |s| s.prepend.is_idle() && s.len() == 3).await;

        assert_eq!(ids(&snapshot), vec!["a", "b", "c"]);
        assert_eq!(snapshot.items.iter().filter(|i| i.id == "b").count(), 1);
        assert!(snapshot.start_reached);
    }

    #[tokio::test]
    async fn test_load_more_refresh_is_ignored() {
        let source = ScriptedSource::new();
        source.page(1, &["a"]);
        let engine = engine(&source);

        assert!(!engine.load_more(Direction::Refresh));
        assert!(!engine.load_more(Direction::Append));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_close_cancels_in_flight_fetch() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        let gate = source.gate(1);
        let engine = engine(&source);

        engine.initialize();
        engine.close();
        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(engine.snapshot().is_empty());
        assert!(!engine.initialize());
        assert!(!engine.load_more(Direction::Append));
    }

    #[tokio::test]
    async fn test_close_settles_waiters() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        let gate = source.gate(1);
        let engine = engine(&source);

        engine.initialize();
        assert!(engine.snapshot().refresh.is_loading());
        engine.close();

        let snapshot = engine.snapshot();
        assert!(!snapshot.is_loading());
        assert!(snapshot.refresh.is_idle());

        let settled = settle(&engine, |s| !s.is_loading()).await;
        assert!(settled.is_empty());

        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!engine.snapshot().is_loading());
    }

    #[tokio::test]
    async fn test_close_after_load_keeps_items() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        source.page(2, &["c"]);
        let gate = source.gate(2);
        let engine = engine(&source);

        engine.initialize();
        loaded(&engine).await;
        engine.load_more(Direction::Append);
        engine.close();

        let snapshot = engine.snapshot();
        assert_eq!(ids(&snapshot), vec!["a", "b"]);
        assert!(snapshot.append.is_idle());
        gate.notify_one();
    }

    #[tokio::test]
    async fn test_wait_until_wakes_on_commit() {
        let source = ScriptedSource::new();
        source.page(1, &["a", "b"]);
        let gate = source.gate(1);
        let engine = engine(&source);

        engine.initialize();
        let mut waiting = tokio_test::task::spawn(engine.wait_until(|s| s.len() == 2));
        tokio_test::assert_pending!(waiting.poll());

        gate.notify_one();
        loaded(&engine).await;

        assert!(waiting.is_woken());
        let snapshot = tokio_test::assert_ready!(waiting.poll());
        assert_eq!(ids(&snapshot), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_subscribers_see_each_commit() {
        let source = ScriptedSource::new();
        source.page(1, &["a"]);
        let engine = engine(&source);
        let mut rx = engine.subscribe();

        engine.initialize();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().refresh.is_loading());

        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert!(snapshot.refresh.is_idle());
        assert_eq!(ids(&snapshot), vec!["a"]);
    }
}
