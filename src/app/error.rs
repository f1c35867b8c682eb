use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum EncyeError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, EncyeError>;
