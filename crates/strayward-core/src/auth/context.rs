//! Session context: who is signed in, and the operations that change it.
//!
//! One `SessionContext` is built at startup and shared (`Arc`) with every
//! consumer. State changes are published on a `watch` channel so views can
//! react to login and logout.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{Api, AuthApi};
use crate::models::{CurrentUser, SignupRequest};

use super::{TokenKind, TokenStore};

/// Fallback shown when the server gives no reason for a failed login.
pub const LOGIN_FAILED: &str = "Login failed";

/// Fallback shown when the server gives no reason for a failed signup.
pub const SIGNUP_FAILED: &str = "Signup failed";

pub const LOGIN_AFTER_SIGNUP_FAILED: &str =
    "Signup succeeded but login failed. Please log in manually.";

pub const DELETE_ACCOUNT_FAILED: &str = "Failed to delete account";

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Startup, before the first auth check has finished
    Unknown,
    Anonymous,
    Authenticated(CurrentUser),
}

impl AuthState {
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

pub struct SessionContext {
    auth: AuthApi,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<AuthState>,
}

impl SessionContext {
    pub fn new(api: &Api) -> Self {
        let (state, _) = watch::channel(AuthState::Unknown);
        Self {
            auth: api.auth(),
            tokens: Arc::clone(api.http().tokens()),
            state,
        }
    }

    /// Current state. An authenticated state whose access token has since
    /// been cleared (failed refresh) is reported as anonymous.
    pub fn state(&self) -> AuthState {
        self.reconcile();
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.state().user().cloned()
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), AuthState::Unknown)
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn transition(&self, next: AuthState) {
        self.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }

    fn reconcile(&self) {
        let stale = self.state.borrow().is_authenticated() && self.tokens.get(TokenKind::Access).is_none();
        if stale {
            info!("Access token gone, session is now anonymous");
            self.transition(AuthState::Anonymous);
        }
    }

    fn clear_tokens(&self) {
        if let Err(e) = self.tokens.clear_all() {
            warn!(error = %e, "Failed to clear stored tokens");
        }
    }

    /// Startup check: a stored access token is only trusted once `GET /me`
    /// accepts it.
    pub async fn check_auth(&self) -> AuthState {
        if self.tokens.get(TokenKind::Access).is_none() {
            debug!("No stored access token");
            self.transition(AuthState::Anonymous);
            return self.state();
        }

        match self.auth.current_user().await {
            Ok(user) => {
                debug!(user_id = user.id, "Stored session is valid");
                self.transition(AuthState::Authenticated(user));
            }
            Err(e) => {
                debug!(error = %e, "Stored session rejected");
                self.clear_tokens();
                self.transition(AuthState::Anonymous);
            }
        }
        self.state()
    }

    /// Log in and load the user. On failure the state is left unchanged
    /// and the error is a message fit for display.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), String> {
        let pair = self.auth.login(email, password).await.map_err(|e| {
            warn!(error = %e, "Login failed");
            e.user_message(LOGIN_FAILED)
        })?;

        self.tokens.store_pair(&pair).map_err(|e| {
            warn!(error = %e, "Failed to persist session tokens");
            LOGIN_FAILED.to_string()
        })?;

        let user = self.auth.current_user().await.map_err(|e| {
            warn!(error = %e, "Failed to load user after login");
            e.user_message(LOGIN_FAILED)
        })?;

        info!(user_id = user.id, "Logged in");
        self.transition(AuthState::Authenticated(user));
        Ok(())
    }

    /// Register an account. Does not sign in.
    pub async fn signup(&self, email: &str, password: &str, full_name: &str) -> Result<(), String> {
        let request = SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            full_name: full_name.to_string(),
        };
        match self.auth.signup(&request).await {
            Ok(user) => {
                info!(user_id = user.id, "Account created");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Signup failed");
                Err(e.user_message(SIGNUP_FAILED))
            }
        }
    }

    /// Register, then log straight in.
    pub async fn signup_and_login(&self, email: &str, password: &str, full_name: &str) -> Result<(), String> {
        self.signup(email, password, full_name).await?;
        self.login(email, password)
            .await
            .map_err(|_| LOGIN_AFTER_SIGNUP_FAILED.to_string())
    }

    /// Always ends anonymous; the remote call is best-effort.
    pub async fn logout(&self) {
        if let Err(e) = self.auth.logout().await {
            warn!(error = %e, "Logout request failed");
        }
        self.clear_tokens();
        info!("Logged out");
        self.transition(AuthState::Anonymous);
    }

    /// Reflect a profile change the server already accepted. No remote call.
    ///
    /// Ignored when no access token is stored: a user is only ever shown
    /// alongside a live session.
    pub fn update_user(&self, user: CurrentUser) {
        if self.tokens.get(TokenKind::Access).is_none() {
            warn!(user_id = user.id, "Ignoring user update without a session");
            return;
        }
        self.transition(AuthState::Authenticated(user));
    }

    /// Deactivate the account, then drop the local session.
    pub async fn delete_account(&self) -> Result<(), String> {
        self.auth.delete_account().await.map_err(|e| {
            warn!(error = %e, "Account deletion failed");
            e.user_message(DELETE_ACCOUNT_FAILED)
        })?;
        self.clear_tokens();
        info!("Account deleted");
        self.transition(AuthState::Anonymous);
        Ok(())
    }
}
