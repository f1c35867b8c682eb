use async_trait::async_trait;

use crate::api::{ApiClient, ApiError, ApiResponse, Listing};
use crate::domain::Post;

#[async_trait]
pub trait PostApi: Send + Sync {
    async fn list_posts(&self, page: u32, limit: u32) -> Result<Listing<Post>, ApiError>;
}

#[async_trait]
impl PostApi for ApiClient {
    async fn list_posts(&self, page: u32, limit: u32) -> Result<Listing<Post>, ApiError> {
        let response: ApiResponse<Vec<Post>> = self
            .get(
                &["api", "v1", "post", "all"],
                &[("page", page.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(response.into())
    }
}
