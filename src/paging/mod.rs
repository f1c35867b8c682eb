//! Incremental loading of paged collections.
//!
//! ```text
//! PageSource (one network call per page) → PagingEngine → Snapshot stream
//! ```
//!
//! A [`PagingEngine`] turns discrete page fetches into one deduplicated item
//! sequence with a load state per [`Direction`], publishing an immutable
//! [`Snapshot`] after every committed change.

pub mod config;
pub mod engine;
pub mod source;
#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

use crate::api::ApiError;

pub use config::{PagingConfig, RefreshFailurePolicy};
pub use engine::PagingEngine;
pub use source::{ArticleScope, ArticleSource, CommentSource, PageSource, PostSource, ReplySource};

/// Opaque, ordered cursor into a collection; a 1-based page number here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageKey(u32);

impl PageKey {
    pub fn new(page: u32) -> Self {
        Self(page)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub key: PageKey,
    pub size: u32,
}

impl PageRequest {
    pub fn new(key: PageKey, size: u32) -> Self {
        Self { key, size }
    }
}

/// A successfully loaded page with its continuation keys.
///
/// `prev_key == None` marks the start of the collection, `next_key == None` the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub prev_key: Option<PageKey>,
    pub next_key: Option<PageKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Refresh,
    Append,
    Prepend,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Refresh => f.write_str("refresh"),
            Direction::Append => f.write_str("append"),
            Direction::Prepend => f.write_str("prepend"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Error(ApiError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, LoadState::Idle)
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            LoadState::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// Everything a consumer can observe about a paged feed at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub refresh: LoadState,
    pub append: LoadState,
    pub prepend: LoadState,
    /// Incremented by every refresh.
    pub generation: u64,
    /// No further pages exist after the last item.
    pub end_reached: bool,
    /// No further pages exist before the first item.
    pub start_reached: bool,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            refresh: LoadState::Idle,
            append: LoadState::Idle,
            prepend: LoadState::Idle,
            generation: 0,
            end_reached: false,
            start_reached: false,
        }
    }
}

impl<T> Snapshot<T> {
    pub fn state(&self, direction: Direction) -> &LoadState {
        match direction {
            Direction::Refresh => &self.refresh,
            Direction::Append => &self.append,
            Direction::Prepend => &self.prepend,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.refresh.is_loading() || self.append.is_loading() || self.prepend.is_loading()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
