use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::api::{ApiError, ArticleApi, CommentApi, Listing, PostApi};
use crate::domain::{Article, ArticleQuery, Comment, CommentTarget, Post};
use crate::paging::{Page, PageKey, PageRequest};

/// Loads one page of a collection.
///
/// Every failure comes back as an [`ApiError`]; implementations do not cache.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn load(&self, request: PageRequest) -> Result<Page<T>, ApiError>;
}

/// Derive continuation keys for a page-numbered listing.
///
/// Page 1 has no previous page; an empty page, or one the server marks as the
/// last, has no next page.
pub fn page_from_listing<T>(key: PageKey, listing: Listing<T>) -> Page<T> {
    let page = key.get();
    let prev_key = if page <= 1 {
        None
    } else {
        Some(PageKey::new(page - 1))
    };
    let next_key = if listing.items.is_empty() || listing.has_more == Some(false) {
        None
    } else {
        page.checked_add(1).map(PageKey::new)
    };

    Page {
        items: listing.items,
        prev_key,
        next_key,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleScope {
    All,
    Organization,
    Search(ArticleQuery),
}

pub struct ArticleSource {
    api: Arc<dyn ArticleApi>,
    scope: ArticleScope,
}

impl ArticleSource {
    pub fn new(api: Arc<dyn ArticleApi>, scope: ArticleScope) -> Self {
        Self { api, scope }
    }
}

#[async_trait]
impl PageSource<Article> for ArticleSource {
    async fn load(&self, request: PageRequest) -> Result<Page<Article>, ApiError> {
        let page = request.key.get();
        debug!("Loading articles ({:?}) page {} x{}", self.scope, page, request.size);
        let listing = match &self.scope {
            ArticleScope::All => self.api.list_articles(page, request.size).await?,
            ArticleScope::Organization => {
                self.api
                    .list_organization_articles(page, request.size)
                    .await?
            }
            ArticleScope::Search(query) => {
                self.api.search_articles(query, page, request.size).await?
            }
        };
        Ok(page_from_listing(request.key, listing))
    }
}

pub struct PostSource {
    api: Arc<dyn PostApi>,
}

impl PostSource {
    pub fn new(api: Arc<dyn PostApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PageSource<Post> for PostSource {
    async fn load(&self, request: PageRequest) -> Result<Page<Post>, ApiError> {
        debug!("Loading posts page {} x{}", request.key, request.size);
        let listing = self.api.list_posts(request.key.get(), request.size).await?;
        Ok(page_from_listing(request.key, listing))
    }
}

/// Top-level comments on an article or post.
pub struct CommentSource {
    api: Arc<dyn CommentApi>,
    target: CommentTarget,
    item_id: String,
}

impl CommentSource {
    pub fn new(
        api: Arc<dyn CommentApi>,
        target: CommentTarget,
        item_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            target,
            item_id: item_id.into(),
        }
    }
}

#[async_trait]
impl PageSource<Comment> for CommentSource {
    async fn load(&self, request: PageRequest) -> Result<Page<Comment>, ApiError> {
        debug!(
            "Loading comments on {} {} page {}",
            self.target, self.item_id, request.key
        );
        let listing = self
            .api
            .list_comments(self.target, &self.item_id, request.key.get(), request.size)
            .await?;
        Ok(page_from_listing(request.key, listing))
    }
}

/// Replies to a single comment.
pub struct ReplySource {
    api: Arc<dyn CommentApi>,
    comment_id: String,
}

impl ReplySource {
    pub fn new(api: Arc<dyn CommentApi>, comment_id: impl Into<String>) -> Self {
        Self {
            api,
            comment_id: comment_id.into(),
        }
    }
}

#[async_trait]
impl PageSource<Comment> for ReplySource {
    async fn load(&self, request: PageRequest) -> Result<Page<Comment>, ApiError> {
        let listing = self
            .api
            .list_replies(&self.comment_id, request.key.get(), request.size)
            .await?;
        Ok(page_from_listing(request.key, listing))
    }
}
