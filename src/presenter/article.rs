use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{ApiError, ArticleApi};
use crate::domain::Article;
use crate::paging::{ArticleScope, ArticleSource, PagingConfig};
use crate::presenter::FeedPresenter;

/// Detail pane contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState<T> {
    #[default]
    Empty,
    Loading,
    Loaded(T),
    Failed(ApiError),
}

/// Article feed plus the article opened from it.
pub struct ArticlePresenter {
    api: Arc<dyn ArticleApi>,
    feed: FeedPresenter<Article>,
    selected: Mutex<Option<Article>>,
    detail: watch::Sender<DetailState<Article>>,
}

impl ArticlePresenter {
    pub fn new(api: Arc<dyn ArticleApi>, scope: ArticleScope, config: PagingConfig) -> Self {
        let source = ArticleSource::new(api.clone(), scope);
        let (detail, _) = watch::channel(DetailState::Empty);
        Self {
            api,
            feed: FeedPresenter::new(Arc::new(source), config),
            selected: Mutex::new(None),
            detail,
        }
    }

    pub fn feed(&self) -> &FeedPresenter<Article> {
        &self.feed
    }

    /// Remember the tapped article so the detail view can show it without a fetch.
    pub fn on_select_item(&self, article: Article) {
        debug!("Selected article {}", article.id);
        *self.selected.lock().unwrap_or_else(PoisonError::into_inner) = Some(article);
    }

    pub async fn open_detail(&self, id: &str) -> DetailState<Article> {
        let cached = self
            .selected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|article| article.id == id)
            .cloned();

        let state = match cached {
            Some(article) => DetailState::Loaded(article),
            None => {
                self.detail.send_replace(DetailState::Loading);
                match self.api.get_article(id).await {
                    Ok(article) => {
                        self.on_select_item(article.clone());
                        DetailState::Loaded(article)
                    }
                    Err(e) => {
                        warn!("Failed to load article {}: {}", id, e);
                        DetailState::Failed(e)
                    }
                }
            }
        };

        self.detail.send_replace(state.clone());
        state
    }

    pub fn detail(&self) -> DetailState<Article> {
        self.detail.borrow().clone()
    }

    pub fn subscribe_detail(&self) -> watch::Receiver<DetailState<Article>> {
        self.detail.subscribe()
    }

    pub fn close_detail(&self) {
        self.detail.send_replace(DetailState::Empty);
    }
}
