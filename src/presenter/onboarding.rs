use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::{ApiError, UserApi};
use crate::app::Result;
use crate::session::{Session, SessionStore};

pub const INVALID_RESPONSE: &str = "Invalid response from server";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OnboardingState {
    #[default]
    Idle,
    Loading,
    Success { is_new_user: bool },
    Failed(String),
}

/// Sign-in flow: trades an authorization code for a stored session.
pub struct OnboardingPresenter {
    api: Arc<dyn UserApi>,
    session: Arc<dyn SessionStore + Send + Sync>,
    state: watch::Sender<OnboardingState>,
}

impl OnboardingPresenter {
    pub fn new(api: Arc<dyn UserApi>, session: Arc<dyn SessionStore + Send + Sync>) -> Self {
        let (state, _) = watch::channel(OnboardingState::Idle);
        Self {
            api,
            session,
            state,
        }
    }

    pub fn state(&self) -> OnboardingState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OnboardingState> {
        self.state.subscribe()
    }

    pub fn current_session(&self) -> Result<Option<Session>> {
        self.session.load()
    }

    pub async fn on_auth_code_received(&self, code: &str) -> OnboardingState {
        let code = code.trim();
        let state = if code.is_empty() {
            OnboardingState::Failed("Missing authorization code".into())
        } else {
            self.state.send_replace(OnboardingState::Loading);
            self.exchange(code).await
        };

        self.state.send_replace(state.clone());
        state
    }

    async fn exchange(&self, code: &str) -> OnboardingState {
        let grant = match self.api.exchange_google_code(code).await {
            Ok(grant) if !grant.token.is_empty() => grant,
            Ok(_) | Err(ApiError::Decode(_)) => {
                warn!("Sign-in response carried no usable token");
                return OnboardingState::Failed(INVALID_RESPONSE.into());
            }
            Err(e) => {
                warn!("Sign-in failed: {}", e);
                return OnboardingState::Failed(e.to_string());
            }
        };

        let session = Session::from_grant(&grant);
        if let Err(e) = self.session.save(&session) {
            warn!("Failed to store session: {}", e);
            return OnboardingState::Failed(e.to_string());
        }

        info!(
            "Signed in as {} (token {})",
            session.display_name(),
            session.fingerprint()
        );
        OnboardingState::Success {
            is_new_user: grant.is_new_user,
        }
    }

    pub fn sign_out(&self) -> Result<()> {
        self.session.clear()?;
        self.state.send_replace(OnboardingState::Idle);
        info!("Signed out");
        Ok(())
    }
}
