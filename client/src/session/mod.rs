//! Client session manager
//!
//! The single source of truth for "is this device logged in". One instance
//! is constructed at startup via [`SessionManager::restore`] and handed to
//! whatever composes the UI; it is never torn down during normal operation.
//!
//! State machine: `LoggedOut -> LoggedIn` on any successful login,
//! registration or social handshake; `LoggedIn -> LoggedOut` on
//! [`SessionManager::logout`] or when [`SessionManager::refresh_profile`]
//! observes a 401/404. `is_loading` is a transient flag, not a state.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::api::AuthApi;
use crate::config::{ClientConfig, TOKEN_KEY, USER_KEY};
use crate::error::ClientError;
use crate::models::{
    AppleLoginBody, AuthResponse, AuthUser, EmailLoginBody, GoogleLoginBody, RegisterBody,
};
use crate::store::{Preferences, SecureStore};


pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Observable session status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// True only while a token is persisted and a profile is cached
    pub is_logged_in: bool,
    pub current_user: Option<AuthUser>,
    pub is_loading: bool,
    /// Latest failure only; cleared by the next operation
    pub error_message: Option<String>,
}

pub struct SessionManager {
    api: AuthApi,
    secure: Arc<dyn SecureStore>,
    prefs: Arc<dyn Preferences>,
    state: watch::Sender<SessionState>,
    /// Number of operations in flight; only touched inside `send_modify`
    in_flight: AtomicUsize,
    /// Serializes token/profile/state commits so overlapping operations
    /// never interleave their writes
    commit: Mutex<()>,
}

/// Clears `is_loading` when the last in-flight operation finishes
struct LoadingGuard<'a> {
    manager: &'a SessionManager,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let in_flight = &self.manager.in_flight;
        self.manager.state.send_modify(|state| {
            let remaining = in_flight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
            state.is_loading = remaining > 0;
        });
    }
}

impl SessionManager {
    /// Builds the manager and rehydrates persisted state.
    ///
    /// Logged in only if a token loads AND a cached profile decodes. A
    /// cached profile without a token is not surfaced.
    pub async fn restore(
        config: &ClientConfig,
        secure: Arc<dyn SecureStore>,
        prefs: Arc<dyn Preferences>,
    ) -> Self {
        Self::with_api(AuthApi::new(&config.base_url), secure, prefs).await
    }

    pub async fn with_api(
        api: AuthApi,
        secure: Arc<dyn SecureStore>,
        prefs: Arc<dyn Preferences>,
    ) -> Self {
        let token = load_token(secure.as_ref()).await;
        let user = load_cached_user(prefs.as_ref()).await;

        let initial = match (token, user) {
            (Some(_), Some(user)) => SessionState {
                is_logged_in: true,
                current_user: Some(user),
                ..SessionState::default()
            },
            (None, Some(_)) => {
                debug!("Cached profile found without a token; starting logged out");
                SessionState::default()
            }
            _ => SessionState::default(),
        };

        info!(logged_in = initial.is_logged_in, "Session restored");

        let (state, _) = watch::channel(initial);
        Self {
            api,
            secure,
            prefs,
            state,
            in_flight: AtomicUsize::new(0),
            commit: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_logged_in
    }

    /// Persisted bearer token for attaching to authenticated requests
    pub async fn bearer_token(&self) -> Option<String> {
        load_token(self.secure.as_ref()).await
    }

    /// Exchange a completed Sign in with Apple ceremony for a session
    pub async fn login_with_apple(
        &self,
        apple_id: &str,
        identity_token: Option<&str>,
        email: Option<&str>,
        name: Option<&str>,
    ) {
        let _loading = self.begin();
        if apple_id.trim().is_empty() {
            return self.fail(ClientError::Precondition("Apple ID is required"));
        }

        let body = AppleLoginBody {
            apple_id,
            identity_token,
            email,
            name,
        };
        self.authenticate("/auth/apple", &body).await;
    }

    pub async fn login_with_google(&self, google_id: &str, email: Option<&str>, name: Option<&str>) {
        let _loading = self.begin();
        if google_id.trim().is_empty() {
            return self.fail(ClientError::Precondition("Google ID is required"));
        }

        let body = GoogleLoginBody {
            google_id,
            email,
            name,
        };
        self.authenticate("/auth/google", &body).await;
    }

    pub async fn login_with_email(&self, email: &str, password: &str) {
        let _loading = self.begin();
        if email.trim().is_empty() {
            return self.fail(ClientError::Precondition("Email is required"));
        }
        if password.is_empty() {
            return self.fail(ClientError::Precondition("Password is required"));
        }

        self.authenticate("/auth/login", &EmailLoginBody { email, password })
            .await;
    }

    /// Password length is checked here first; the service re-checks it.
    pub async fn register_with_email(&self, email: &str, password: &str, name: Option<&str>) {
        let _loading = self.begin();
        if email.trim().is_empty() {
            return self.fail(ClientError::Precondition("Email is required"));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return self.fail(ClientError::Precondition(
                "Password must be at least 8 characters",
            ));
        }

        let body = RegisterBody {
            email,
            password,
            name: name.filter(|n| !n.trim().is_empty()),
        };
        self.authenticate("/auth/register", &body).await;
    }

    /// Local only: no server call, no revocation.
    pub async fn logout(&self) {
        let _commit = self.commit.lock().await;
        self.clear_persisted().await;
        self.state.send_modify(|state| {
            state.is_logged_in = false;
            state.current_user = None;
            state.error_message = None;
        });
        info!("Logged out");
    }

    /// Re-reads the profile from `GET /me`. A 401 or 404 ends the session.
    pub async fn refresh_profile(&self) {
        let _loading = self.begin();
        let Some(token) = self.bearer_token().await else {
            return self.fail(ClientError::Precondition("Not logged in"));
        };

        match self.api.fetch_profile(&token).await {
            Ok(user) => {
                if let Err(e) = self.commit_profile(&token, user).await {
                    self.fail(e);
                }
            }
            Err(err @ ClientError::Api {
                status: 401 | 404, ..
            }) => {
                self.end_session_for(&token).await;
                self.fail(err);
            }
            Err(err) => self.fail(err),
        }
    }

    fn begin(&self) -> LoadingGuard<'_> {
        let in_flight = &self.in_flight;
        self.state.send_modify(|state| {
            in_flight.fetch_add(1, Ordering::SeqCst);
            state.is_loading = true;
            state.error_message = None;
        });
        LoadingGuard { manager: self }
    }

    fn fail(&self, err: ClientError) {
        warn!(error = %err, "Session operation failed");
        let message = err.to_string();
        self.state.send_modify(|state| state.error_message = Some(message));
    }

    async fn authenticate<B>(&self, endpoint: &str, body: &B)
    where
        B: Serialize + ?Sized,
    {
        let outcome = match self.api.post_credentials(endpoint, body).await {
            Ok(response) => self.commit_login(response).await,
            Err(err) => Err(err),
        };

        if let Err(err) = outcome {
            self.fail(err);
        }
    }

    /// Token first, then profile, then state. A failed write leaves the
    /// device logged out; the previous token may already be gone.
    async fn commit_login(&self, response: AuthResponse) -> Result<(), ClientError> {
        let AuthResponse { token, user } = response;
        let encoded = serde_json::to_string(&user)?;

        let _commit = self.commit.lock().await;
        let persisted = match self.secure.save(TOKEN_KEY, &token).await {
            Ok(()) => self.prefs.set(USER_KEY, &encoded).await,
            Err(e) => Err(e),
        };
        if let Err(e) = persisted {
            warn!(error = %e, "Failed to persist session, resetting to logged out");
            self.reset_locked().await;
            return Err(e.into());
        }

        info!(user_id = %user.id, "Logged in");
        self.state.send_modify(|state| {
            state.is_logged_in = true;
            state.current_user = Some(user);
            state.error_message = None;
        });
        Ok(())
    }

    async fn commit_profile(&self, token: &str, user: AuthUser) -> Result<(), ClientError> {
        let encoded = serde_json::to_string(&user)?;

        let _commit = self.commit.lock().await;
        if load_token(self.secure.as_ref()).await.as_deref() != Some(token) {
            debug!("Session changed while the profile was loading; discarding it");
            return Ok(());
        }
        self.prefs.set(USER_KEY, &encoded).await?;
        self.state.send_modify(|state| {
            state.current_user = Some(user);
            state.error_message = None;
        });
        Ok(())
    }

    /// Logs out only if `token` is still the persisted one, so a stale
    /// rejection cannot end a newer session.
    async fn end_session_for(&self, token: &str) {
        let _commit = self.commit.lock().await;
        if load_token(self.secure.as_ref()).await.as_deref() != Some(token) {
            return;
        }
        self.reset_locked().await;
        info!("Session ended by the auth service");
    }

    /// Caller holds `commit`
    async fn reset_locked(&self) {
        self.clear_persisted().await;
        self.state.send_modify(|state| {
            state.is_logged_in = false;
            state.current_user = None;
        });
    }

    async fn clear_persisted(&self) {
        if let Err(e) = self.secure.delete(TOKEN_KEY).await {
            warn!(error = %e, "Failed to delete persisted token");
        }
        if let Err(e) = self.prefs.remove(USER_KEY).await {
            warn!(error = %e, "Failed to remove cached profile");
        }
    }
}

/// Store failures read as "no token"
async fn load_token(secure: &dyn SecureStore) -> Option<String> {
    match secure.load(TOKEN_KEY).await {
        Ok(token) => token.filter(|t| !t.is_empty()),
        Err(e) => {
            warn!(error = %e, "Secure store unreadable, treating as logged out");
            None
        }
    }
}

async fn load_cached_user(prefs: &dyn Preferences) -> Option<AuthUser> {
    let raw = match prefs.get(USER_KEY).await {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(error = %e, "Preferences unreadable");
            return None;
        }
    };

    serde_json::from_str(&raw)
        .map_err(|e| warn!(error = %e, "Cached profile does not decode"))
        .ok()
}
