pub mod articles;
pub mod client;
pub mod comments;
pub mod error;
pub mod posts;
pub mod users;

use serde::Deserialize;

pub use articles::ArticleApi;
pub use client::ApiClient;
pub use comments::CommentApi;
pub use error::ApiError;
pub use posts::PostApi;
pub use users::UserApi;

/// Envelope wrapped around every backend response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
    pub total_count: Option<u64>,
    pub current_page: Option<u32>,
    pub has_more: Option<bool>,
}

impl<T> ApiResponse<T> {
    /// The payload, treating a missing `data` field as a malformed response.
    pub fn into_data(self) -> Result<T, ApiError> {
        self.data
            .ok_or_else(|| ApiError::Decode(format!("response has no data: {}", self.msg)))
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total_count: Option<u64>,
    pub current_page: Option<u32>,
    pub has_more: Option<bool>,
}

impl<T> From<ApiResponse<Vec<T>>> for Listing<T> {
    fn from(response: ApiResponse<Vec<T>>) -> Self {
        Self {
            items: response.data.unwrap_or_default(),
            total_count: response.total_count,
            current_page: response.current_page,
            has_more: response.has_more,
        }
    }
}

impl<T> Listing<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            total_count: None,
            current_page: None,
            has_more: None,
        }
    }
}
