use async_trait::async_trait;

use crate::api::{ApiClient, ApiError, ApiResponse};
use crate::domain::AuthGrant;

#[async_trait]
pub trait UserApi: Send + Sync {
    /// Exchange a federated sign-in authorization code for a session token.
    async fn exchange_google_code(&self, code: &str) -> Result<AuthGrant, ApiError>;
}

#[async_trait]
impl UserApi for ApiClient {
    async fn exchange_google_code(&self, code: &str) -> Result<AuthGrant, ApiError> {
        let response: ApiResponse<AuthGrant> = self
            .get(
                &["api", "v1", "user", "auth", "google", "callback"],
                &[("code", code.to_string())],
            )
            .await?;
        response.into_data()
    }
}
