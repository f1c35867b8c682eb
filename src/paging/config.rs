use serde::{Deserialize, Serialize};

use crate::paging::PageKey;

/// What a failed refresh does to the items that were on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshFailurePolicy {
    /// The feed stays empty and carries the refresh error.
    #[default]
    Clear,
    /// Previous items stay visible while reloading and are restored on failure.
    KeepStale,
}

/// Configuration for a paging engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Items requested per page (default: 10)
    pub page_size: u32,

    /// Page key the first load and every refresh start from (default: 1)
    pub initial_key: u32,

    /// Items requested by the first load; unset means `page_size`
    pub initial_load_size: Option<u32>,

    /// How close to the end a visible item must be to trigger the next page
    pub prefetch_distance: usize,

    pub refresh_failure: RefreshFailurePolicy,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            initial_key: 1,
            initial_load_size: None,
            prefetch_distance: 10,
            refresh_failure: RefreshFailurePolicy::Clear,
        }
    }
}

impl PagingConfig {
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            page_size,
            prefetch_distance: page_size as usize,
            ..Default::default()
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.max(1)
    }

    pub fn initial_load_size(&self) -> u32 {
        self.initial_load_size.unwrap_or(self.page_size).max(1)
    }

    pub fn initial_key(&self) -> PageKey {
        PageKey::new(self.initial_key.max(1))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.page_size == 0 {
            return Err("paging.page_size must be greater than zero".into());
        }
        if self.initial_key == 0 {
            return Err("paging.initial_key is 1-based".into());
        }
        if self.initial_load_size == Some(0) {
            return Err("paging.initial_load_size must be greater than zero".into());
        }
        Ok(())
    }
}
