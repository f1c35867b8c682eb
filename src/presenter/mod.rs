//! Screen-facing state holders.
//!
//! Each presenter owns the paging engines for its screen, turns user intents
//! into engine or repository calls, and exposes the result as plain state.

pub mod article;
pub mod comments;
pub mod feed;
pub mod home;
pub mod onboarding;

pub use article::{ArticlePresenter, DetailState};
pub use comments::CommentsPresenter;
pub use feed::{Edge, FeedPresenter, FeedStatus};
pub use home::HomePresenter;
pub use onboarding::{OnboardingPresenter, OnboardingState, INVALID_RESPONSE};
