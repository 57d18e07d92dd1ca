//! Relay between the storefront and the external identity service.
//!
//! The service owns accounts and sessions. [`SessionRelay`] only forwards
//! credentials, keeps the one current [`SessionState`] and broadcasts every
//! change to whoever subscribed.

mod error;
pub mod firebase;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{info, warn};

pub use error::{AuthError, AuthErrorCode};
pub use firebase::FirebaseIdentity;

use crate::models::{Session, SessionState};

/// Token obtained from a federated provider, exchanged for a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FederatedCredential {
    pub provider_id: String,
    pub id_token: String,
}

impl FederatedCredential {
    pub fn google(id_token: impl Into<String>) -> Self {
        Self {
            provider_id: "google.com".to_string(),
            id_token: id_token.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError>;

    async fn sign_in_with_idp(&self, credential: &FederatedCredential)
        -> Result<Session, AuthError>;

    async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<Session, AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;
}

pub struct SessionRelay {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Sender<SessionState>,
}

impl SessionRelay {
    /// Starts in [`SessionState::Loading`] until [`SessionRelay::restore`] or
    /// the first sign-in attempt settles it.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self { provider, state }
    }

    pub fn restore(&self, session: Option<Session>) {
        match session {
            Some(session) => self.publish(SessionState::SignedIn(session)),
            None => self.publish(SessionState::SignedOut),
        }
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Creates the account, then attaches the display name and photo. The
    /// account is signed in as soon as it exists, even if the profile step
    /// fails afterwards.
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        photo_url: Option<&str>,
    ) -> Result<Session, AuthError> {
        let created = self
            .provider
            .create_account(email, password)
            .await
            .inspect_err(|e| self.rejected("sign-up", e))?;
        info!(uid = %created.uid, "account created");
        self.publish(SessionState::SignedIn(created.clone()));

        let update = ProfileUpdate {
            display_name: Some(name.to_string()),
            photo_url: photo_url.map(str::to_string),
        };
        let session = self
            .provider
            .update_profile(&created, &update)
            .await
            .inspect_err(|e| warn!(error = %e, "profile setup after sign-up failed"))?;
        self.publish(SessionState::SignedIn(session.clone()));
        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self
            .provider
            .sign_in_with_password(email, password)
            .await
            .inspect_err(|e| self.rejected("sign-in", e))?;
        info!(uid = %session.uid, "signed in");
        self.publish(SessionState::SignedIn(session.clone()));
        Ok(session)
    }

    pub async fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Session, AuthError> {
        let session = self
            .provider
            .sign_in_with_idp(credential)
            .await
            .inspect_err(|e| self.rejected("federated sign-in", e))?;
        info!(uid = %session.uid, provider = %credential.provider_id, "signed in");
        self.publish(SessionState::SignedIn(session.clone()));
        Ok(session)
    }

    /// Local only, the service keeps no server-side session to revoke.
    pub fn sign_out(&self) {
        if let Some(session) = self.current().session() {
            info!(uid = %session.uid, "signed out");
        }
        self.publish(SessionState::SignedOut);
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Session, AuthError> {
        let current = self.current();
        let session = current.session().ok_or(AuthError::NoSession)?;
        let updated = self
            .provider
            .update_profile(session, update)
            .await
            .inspect_err(|e| self.rejected("profile update", e))?;
        info!(uid = %updated.uid, "profile updated");
        self.publish(SessionState::SignedIn(updated.clone()));
        Ok(updated)
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        self.provider
            .send_password_reset(email)
            .await
            .inspect_err(|e| self.rejected("password reset", e))?;
        info!("password reset email requested");
        Ok(())
    }

    fn publish(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    // A failed attempt settles a still-loading session so gated views stop
    // waiting, an existing session is left alone.
    fn rejected(&self, operation: &str, error: &AuthError) {
        warn!(
            operation,
            code = error.code().map(AuthErrorCode::code),
            error = %error,
            "identity service rejected request"
        );
        self.state.send_if_modified(|state| {
            if *state == SessionState::Loading {
                *state = SessionState::SignedOut;
                true
            } else {
                false
            }
        });
    }
}
