use async_trait::async_trait;
use reqwest::Method;
use serde::de::IgnoredAny;

use crate::api::{ApiClient, ApiError, ApiResponse, Listing};
use crate::domain::{Comment, CommentRequest, CommentTarget};

#[async_trait]
pub trait CommentApi: Send + Sync {
    async fn list_comments(
        &self,
        target: CommentTarget,
        item_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Listing<Comment>, ApiError>;

    async fn list_replies(
        &self,
        comment_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Listing<Comment>, ApiError>;

    async fn create_comment(
        &self,
        target: CommentTarget,
        item_id: &str,
        text: &str,
    ) -> Result<Comment, ApiError>;

    async fn reply_to_comment(&self, comment_id: &str, text: &str) -> Result<Comment, ApiError>;

    async fn update_comment(&self, comment_id: &str, text: &str) -> Result<Comment, ApiError>;

    async fn delete_comment(&self, comment_id: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl CommentApi for ApiClient {
    async fn list_comments(
        &self,
        target: CommentTarget,
        item_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Listing<Comment>, ApiError> {
        let response: ApiResponse<Vec<Comment>> = self
            .get(
                &["api", "v1", "comment", "all", target.as_str(), item_id],
                &[("page", page.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(response.into())
    }

    async fn list_replies(
        &self,
        comment_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Listing<Comment>, ApiError> {
        let response: ApiResponse<Vec<Comment>> = self
            .get(
                &["api", "v1", "comment", "all", "replies", comment_id],
                &[("page", page.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(response.into())
    }

    async fn create_comment(
        &self,
        target: CommentTarget,
        item_id: &str,
        text: &str,
    ) -> Result<Comment, ApiError> {
        let builder = self
            .request(
                Method::POST,
                &["api", "v1", "comment", "create", target.as_str(), item_id],
            )?
            .json(&CommentRequest::new(text));
        let response: ApiResponse<Comment> = self.send(builder).await?;
        response.into_data()
    }

    async fn reply_to_comment(&self, comment_id: &str, text: &str) -> Result<Comment, ApiError> {
        let builder = self
            .request(Method::POST, &["api", "v1", "comment", "reply", comment_id])?
            .json(&CommentRequest::new(text));
        let response: ApiResponse<Comment> = self.send(builder).await?;
        response.into_data()
    }

    async fn update_comment(&self, comment_id: &str, text: &str) -> Result<Comment, ApiError> {
        let builder = self
            .request(Method::PATCH, &["api", "v1", "comment", comment_id])?
            .json(&CommentRequest::new(text));
        let response: ApiResponse<Comment> = self.send(builder).await?;
        response.into_data()
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, &["api", "v1", "comment", comment_id])?;
        let _: ApiResponse<IgnoredAny> = self.send(builder).await?;
        Ok(())
    }
}
