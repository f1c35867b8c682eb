use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::api::{ApiError, ApiResponse};
use crate::config::ApiConfig;
use crate::session::SessionStore;

/// HTTP transport shared by every repository.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Arc<dyn SessionStore + Send + Sync>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    msg: String,
}

impl ApiClient {
    pub fn new(
        config: &ApiConfig,
        session: Arc<dyn SessionStore + Send + Sync>,
    ) -> Result<Self, ApiError> {
        let base_url = config
            .parsed_base_url()
            .map_err(|e| ApiError::InvalidRequest(format!("base URL: {}", e)))?;

        let http = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore + Send + Sync> {
        &self.session
    }

    /// Build an endpoint URL from path segments; each segment is percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        Ok(self.authorize(self.http.request(method, url)))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(e) => {
                warn!("Could not read session token, sending unauthenticated: {}", e);
                builder
            }
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>, ApiError> {
        let builder = self.request(Method::GET, segments)?.query(query);
        self.send(builder).await
    }

    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url().path());
        let body = response.bytes().await?;
        decode_envelope(status, &body)
    }
}

/// Turn a raw response into an envelope, mapping HTTP and API failures to errors.
pub(crate) fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<ApiResponse<T>, ApiError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .map(|b| b.msg)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        return Err(ApiError::from_status(status, message));
    }

    let envelope: ApiResponse<T> = serde_json::from_slice(body)?;
    if !envelope.success {
        return Err(ApiError::Server {
            status: status.as_u16(),
            message: envelope.msg,
        });
    }

    Ok(envelope)
}
