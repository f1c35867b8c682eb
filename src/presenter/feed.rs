use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::api::ApiError;
use crate::domain::Identified;
use crate::paging::{Direction, PageSource, PagingConfig, PagingEngine, Snapshot};

/// What sits above the first or below the last item of a non-empty feed.
#[derive(Debug, Clone, PartialEq)]
pub enum Edge {
    None,
    Loading,
    Failed(ApiError),
    End,
}

/// Screen-level summary of a feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedStatus {
    /// First page is on its way and nothing is shown yet.
    Loading,
    /// First page or refresh failed and nothing is shown.
    Failed(ApiError),
    /// Loaded, and the collection has no items.
    Empty,
    Ready { header: Edge, footer: Edge },
}

impl FeedStatus {
    pub fn from_snapshot<T>(snapshot: &Snapshot<T>) -> Self {
        if snapshot.is_empty() {
            if let Some(error) = snapshot.refresh.error() {
                return FeedStatus::Failed(error.clone());
            }
            if snapshot.end_reached && !snapshot.refresh.is_loading() {
                return FeedStatus::Empty;
            }
            return FeedStatus::Loading;
        }

        let header = if snapshot.prepend.is_loading() {
            Edge::Loading
        } else if let Some(error) = snapshot.prepend.error() {
            Edge::Failed(error.clone())
        } else if snapshot.start_reached {
            Edge::End
        } else {
            Edge::None
        };
        let footer = if snapshot.append.is_loading() {
            Edge::Loading
        } else if let Some(error) = snapshot.append.error().or(snapshot.refresh.error()) {
            Edge::Failed(error.clone())
        } else if snapshot.end_reached {
            Edge::End
        } else {
            Edge::None
        };
        FeedStatus::Ready { header, footer }
    }
}

/// Translates scrolling and refresh gestures into engine calls for one feed.
pub struct FeedPresenter<T> {
    engine: PagingEngine<T>,
}

impl<T> FeedPresenter<T>
where
    T: Identified + Clone + Send + Sync + 'static,
{
    pub fn new(source: Arc<dyn PageSource<T>>, config: PagingConfig) -> Self {
        Self {
            engine: PagingEngine::new(source, config),
        }
    }

    pub fn engine(&self) -> &PagingEngine<T> {
        &self.engine
    }

    pub fn snapshot(&self) -> Arc<Snapshot<T>> {
        self.engine.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot<T>>> {
        self.engine.subscribe()
    }

    pub fn status(&self) -> FeedStatus {
        FeedStatus::from_snapshot(&self.engine.snapshot())
    }

    pub fn on_start(&self) -> bool {
        self.engine.initialize()
    }

    pub fn on_reach_end(&self) -> bool {
        self.engine.load_more(Direction::Append)
    }

    pub fn on_reach_start(&self) -> bool {
        self.engine.load_more(Direction::Prepend)
    }

    /// Prefetch the next page once `index` is within the prefetch distance of the end.
    pub fn on_item_visible(&self, index: usize) -> bool {
        let len = self.engine.snapshot().len();
        let distance = self.engine.config().prefetch_distance;
        if index.saturating_add(distance) < len {
            return false;
        }
        debug!("Item {} of {} visible, prefetching", index, len);
        self.engine.load_more(Direction::Append)
    }

    pub fn on_pull_to_refresh(&self) {
        self.engine.refresh();
    }

    /// Retry whichever direction failed, refresh first.
    pub fn on_retry(&self) -> bool {
        let snapshot = self.engine.snapshot();
        [Direction::Refresh, Direction::Append, Direction::Prepend]
            .into_iter()
            .find(|direction| snapshot.state(*direction).error().is_some())
            .is_some_and(|direction| self.engine.retry(direction))
    }

    /// Wait until no direction is loading.
    pub async fn settled(&self) -> Arc<Snapshot<T>> {
        self.engine.wait_until(|s| !s.is_loading()).await
    }

    /// Load the first page and then up to `pages - 1` more, stopping at the
    /// end of the collection or on the first failure.
    pub async fn load_pages(&self, pages: usize) -> FeedStatus {
        self.on_start();
        let mut snapshot = self.settled().await;

        for _ in 1..pages {
            if snapshot.refresh.error().is_some() || !self.on_reach_end() {
                break;
            }
            snapshot = self.settled().await;
        }

        FeedStatus::from_snapshot(&snapshot)
    }

    pub fn close(&self) {
        self.engine.close();
    }
}
