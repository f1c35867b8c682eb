//! Persisted sign-in session.
//!
//! Only the bearer token is needed by the transport; the profile fields are
//! kept for display.

pub mod memory;
pub mod sqlite;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::app::Result;
use crate::domain::AuthGrant;

pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: None,
            first_name: None,
            last_name: None,
            created_at: Utc::now(),
        }
    }

    pub fn from_grant(grant: &AuthGrant) -> Self {
        Self {
            token: grant.token.clone(),
            user_id: Some(grant.user_id.clone()),
            first_name: Some(grant.first_name.clone()),
            last_name: Some(grant.last_name.clone()),
            created_at: Utc::now(),
        }
    }

    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => self.user_id.clone().unwrap_or_else(|| "(unknown)".into()),
        }
    }

    /// Short, non-reversible token identifier safe to put in logs.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.token.as_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..8].to_string()
    }
}

pub trait SessionStore {
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;

    fn token(&self) -> Result<Option<String>> {
        Ok(self.load()?.map(|s| s.token))
    }
}
