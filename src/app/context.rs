use std::sync::Arc;

use tracing::debug;

use crate::api::ApiClient;
use crate::app::error::Result;
use crate::config::Config;
use crate::domain::CommentTarget;
use crate::paging::ArticleScope;
use crate::presenter::{
    ArticlePresenter, CommentsPresenter, HomePresenter, OnboardingPresenter,
};
use crate::session::SqliteSessionStore;

/// Wires configuration, session storage and the API client together and
/// hands out presenters built on them.
pub struct AppContext {
    pub config: Config,
    pub session: Arc<SqliteSessionStore>,
    pub client: Arc<ApiClient>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let session_path = config.session_path()?;
        debug!("Opening session store at {}", session_path.display());
        let session = Arc::new(SqliteSessionStore::new(&session_path)?);
        Self::with_session(config, session)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let session = Arc::new(SqliteSessionStore::in_memory()?);
        Self::with_session(config, session)
    }

    fn with_session(config: Config, session: Arc<SqliteSessionStore>) -> Result<Self> {
        let client = Arc::new(ApiClient::new(&config.api, session.clone())?);
        Ok(Self {
            config,
            session,
            client,
        })
    }

    pub fn articles(&self, scope: ArticleScope) -> ArticlePresenter {
        ArticlePresenter::new(self.client.clone(), scope, self.config.paging.clone())
    }

    pub fn home(&self) -> HomePresenter {
        HomePresenter::new(self.client.clone(), self.config.paging.clone())
    }

    pub fn comments(&self, target: CommentTarget, item_id: &str) -> CommentsPresenter {
        CommentsPresenter::new(
            self.client.clone(),
            target,
            item_id,
            self.config.paging.clone(),
        )
    }

    pub fn onboarding(&self) -> OnboardingPresenter {
        OnboardingPresenter::new(self.client.clone(), self.session.clone())
    }
}
