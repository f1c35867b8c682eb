use std::sync::Arc;

use crate::api::PostApi;
use crate::domain::Post;
use crate::paging::{PagingConfig, PostSource};
use crate::presenter::FeedPresenter;

/// Home screen: the community post feed.
pub struct HomePresenter {
    posts: FeedPresenter<Post>,
}

impl HomePresenter {
    pub fn new(api: Arc<dyn PostApi>, config: PagingConfig) -> Self {
        Self {
            posts: FeedPresenter::new(Arc::new(PostSource::new(api)), config),
        }
    }

    pub fn posts(&self) -> &FeedPresenter<Post> {
        &self.posts
    }
}
