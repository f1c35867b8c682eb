use std::sync::Arc;

use tracing::info;

use crate::api::{ApiError, CommentApi};
use crate::domain::{Comment, CommentTarget};
use crate::paging::{CommentSource, PagingConfig, ReplySource};
use crate::presenter::FeedPresenter;

/// Comment thread under an article or post.
///
/// Every successful mutation refreshes the thread so the server's ordering and
/// counts are shown.
pub struct CommentsPresenter {
    api: Arc<dyn CommentApi>,
    target: CommentTarget,
    item_id: String,
    config: PagingConfig,
    feed: FeedPresenter<Comment>,
}

fn require_text(text: &str) -> Result<&str, ApiError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ApiError::InvalidRequest("comment text is empty".into()));
    }
    Ok(text)
}

impl CommentsPresenter {
    pub fn new(
        api: Arc<dyn CommentApi>,
        target: CommentTarget,
        item_id: impl Into<String>,
        config: PagingConfig,
    ) -> Self {
        let item_id = item_id.into();
        let source = CommentSource::new(api.clone(), target, item_id.clone());
        Self {
            feed: FeedPresenter::new(Arc::new(source), config.clone()),
            api,
            target,
            item_id,
            config,
        }
    }

    pub fn feed(&self) -> &FeedPresenter<Comment> {
        &self.feed
    }

    pub fn target(&self) -> CommentTarget {
        self.target
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    /// Separate feed of replies to one comment.
    pub fn replies(&self, comment_id: &str) -> FeedPresenter<Comment> {
        let source = ReplySource::new(self.api.clone(), comment_id);
        FeedPresenter::new(Arc::new(source), self.config.clone())
    }

    pub async fn post_comment(&self, text: &str) -> Result<Comment, ApiError> {
        let text = require_text(text)?;
        let comment = self
            .api
            .create_comment(self.target, &self.item_id, text)
            .await?;
        info!("Posted comment {} on {} {}", comment.id, self.target, self.item_id);
        self.feed.on_pull_to_refresh();
        Ok(comment)
    }

    pub async fn reply(&self, comment_id: &str, text: &str) -> Result<Comment, ApiError> {
        let text = require_text(text)?;
        let reply = self.api.reply_to_comment(comment_id, text).await?;
        info!("Replied to comment {}", comment_id);
        self.feed.on_pull_to_refresh();
        Ok(reply)
    }

    pub async fn edit(&self, comment_id: &str, text: &str) -> Result<Comment, ApiError> {
        let text = require_text(text)?;
        let comment = self.api.update_comment(comment_id, text).await?;
        self.feed.on_pull_to_refresh();
        Ok(comment)
    }

    pub async fn delete(&self, comment_id: &str) -> Result<(), ApiError> {
        self.api.delete_comment(comment_id).await?;
        info!("Deleted comment {}", comment_id);
        self.feed.on_pull_to_refresh();
        Ok(())
    }
}
