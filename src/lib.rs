//! # encye
//!
//! Data-loading layer for the encye social/news feed client.
//!
//! ## Architecture
//!
//! ```text
//! Presenter → PagingEngine → PageSource → ApiClient → network
//!     ↑                                       ↑
//!  snapshots                            SessionStore (token)
//! ```
//!
//! - [`paging`]: incremental, deduplicated loading of page-numbered listings
//! - [`presenter`]: screen state holders driving the engines
//! - [`api`]: REST transport and repository traits
//! - [`session`]: persisted sign-in token
//!
//! ## Quick Start
//!
//! ```bash
//! # First two pages of articles
//! encye articles --pages 2
//!
//! # One article with its comments
//! encye article 65f1c2
//!
//! # Sign in and comment
//! encye login <code>
//! encye comment post 65f1d0 "Nice one"
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together config, session
/// store and API client, and builds presenters on them.
pub mod app;

/// REST transport.
///
/// - [`ApiClient`](api::ApiClient): reqwest client with bearer auth and envelope decoding
/// - [`ArticleApi`](api::ArticleApi), [`PostApi`](api::PostApi),
///   [`CommentApi`](api::CommentApi), [`UserApi`](api::UserApi): repository traits
pub mod api;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/encye/config.toml`.
pub mod config;

/// Server records (articles, posts, comments, users) and display helpers.
pub mod domain;

/// Paging engine, page sources and snapshots.
pub mod paging;

/// Feed, article, comment and onboarding presenters.
pub mod presenter;

/// Session token persistence.
///
/// - [`SessionStore`](session::SessionStore): storage trait
/// - [`SqliteSessionStore`](session::SqliteSessionStore): SQLite implementation
pub mod session;
