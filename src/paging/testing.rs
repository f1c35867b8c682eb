//! Scripted page sources shared by engine and presenter tests.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::{ApiError, Listing};
use crate::domain::Identified;
use crate::paging::source::page_from_listing;
use crate::paging::{Page, PageRequest, PageSource, PagingEngine, Snapshot};

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: String,
}

impl Identified for Item {
    fn id(&self) -> &str {
        &self.id
    }
}

pub fn item(id: &str) -> Item {
    Item { id: id.to_string() }
}

pub fn ids<T: Identified>(snapshot: &Snapshot<T>) -> Vec<&str> {
    snapshot.items.iter().map(|i| i.id()).collect()
}

/// Wait for a matching snapshot, failing the test after five seconds.
pub async fn settle<T, F>(engine: &PagingEngine<T>, predicate: F) -> Arc<Snapshot<T>>
where
    T: Identified + Clone + Send + Sync + 'static,
    F: FnMut(&Snapshot<T>) -> bool,
{
    within(engine.wait_until(predicate)).await
}

pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out waiting for feed state")
}

#[derive(Clone)]
enum Scripted {
    Items(Vec<String>),
    Fail(ApiError),
}

/// Replays queued responses per page number.
///
/// Responses for a page are consumed in order; the last one repeats.
/// A gated page waits for its [`Notify`] before answering.
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<HashMap<u32, VecDeque<Scripted>>>,
    gates: Mutex<HashMap<u32, Arc<Notify>>>,
    requests: Mutex<Vec<PageRequest>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn page(&self, page: u32, ids: &[&str]) {
        let ids = ids.iter().map(|id| id.to_string()).collect();
        self.push(page, Scripted::Items(ids));
    }

    pub fn fail(&self, page: u32, error: ApiError) {
        self.push(page, Scripted::Fail(error));
    }

    pub fn gate(&self, page: u32) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(page, gate.clone());
        gate
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, page: u32, response: Scripted) {
        self.script
            .lock()
            .unwrap()
            .entry(page)
            .or_default()
            .push_back(response);
    }

    fn next(&self, page: u32) -> Scripted {
        let mut script = self.script.lock().unwrap();
        let queue = script.entry(page).or_default();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or(Scripted::Items(Vec::new()))
        }
    }
}

#[async_trait]
impl PageSource<Item> for ScriptedSource {
    async fn load(&self, request: PageRequest) -> Result<Page<Item>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        let page = request.key.get();
        let gate = self.gates.lock().unwrap().get(&page).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match self.next(page) {
            Scripted::Items(ids) => {
                let items = ids.iter().map(|id| item(id)).collect();
                Ok(page_from_listing(request.key, Listing::new(items)))
            }
            Scripted::Fail(error) => Err(error),
        }
    }
}
