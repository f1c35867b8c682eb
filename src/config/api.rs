use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://test.server.encye.com/";

/// Configuration for the REST transport
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root of the backend; endpoint paths are appended to it
    pub base_url: String,

    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            user_agent: format!("encye/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parse the base URL, making sure it ends in `/` so joined paths keep any prefix.
    pub fn parsed_base_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.base_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.user_agent.starts_with("encye/"));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ApiConfig::with_base_url("https://api.example.com/prefix");
        let url = config.parsed_base_url().unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/prefix/");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ApiConfig::with_base_url("not a url");
        assert!(config.parsed_base_url().is_err());
    }
}
