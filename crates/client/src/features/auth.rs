//! Authentication pipeline: login, registration, logout.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::watch;
use tracing::{instrument, warn};

use shopkit_core::UserProfile;

use crate::auth::SessionStatus;
use crate::http::ApiClient;
use crate::pipeline::{IntentSeq, StateCell};

/// Fixed user-facing message for any login failure. The real cause is
/// deliberately not surfaced.
const LOGIN_FAILED: &str = "Invalid email or password. Please try again.";
const REGISTER_OK: &str = "Registration successful!";
const REGISTER_FAILED: &str = "Registration failed. Please check your details and try again.";

/// Observable authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthState {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
    pub loading: bool,
    pub error: Option<String>,
    pub success_message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    user: UserProfile,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    user: RegisteredUser,
}

#[derive(Deserialize)]
struct RegisteredUser {
    id: shopkit_core::UserId,
    name: String,
    email: String,
}

struct AuthStoreInner {
    api: ApiClient,
    state: StateCell<AuthState>,
    login_seq: IntentSeq,
    register_seq: IntentSeq,
    logout_seq: IntentSeq,
}

/// Store driving the authentication pipeline.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<AuthStoreInner>,
}

impl AuthStore {
    /// Create the store, hydrating state from credentials that survived the
    /// last run.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let session = api.session();
        let initial = AuthState {
            token: session
                .access_token()
                .map(|t| t.expose_secret().to_string()),
            refresh_token: session
                .refresh_token()
                .map(|t| t.expose_secret().to_string()),
            user: session.current_user(),
            ..AuthState::default()
        };
        Self {
            inner: Arc::new(AuthStoreInner {
                api,
                state: StateCell::new(initial),
                login_seq: IntentSeq::new(),
                register_seq: IntentSeq::new(),
                logout_seq: IntentSeq::new(),
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.inner.state.get()
    }

    /// Subscribe to state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Log in with email and password.
    ///
    /// On success all three credential entries are persisted under a window
    /// derived from the refresh token's expiry claim; a login superseded by
    /// a newer one persists nothing. On failure of any kind the state
    /// carries one fixed message.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) {
        let ticket = self.inner.login_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
            s.success_message = None;
        });

        let response = self.fetch_login(email, password).await;
        if !ticket.is_current() {
            // A newer login owns the session now; this result must not
            // touch the store or the status channel.
            return;
        }

        let outcome = response.and_then(|r| {
            self.inner
                .api
                .session()
                .persist_login(&r.access_token, &r.refresh_token, &r.user)
                .ok()?;
            Some((r.access_token, r.refresh_token, r.user))
        });

        self.inner.state.update(|s| {
            s.loading = false;
            match outcome {
                Some((token, refresh_token, user)) => {
                    s.token = Some(token);
                    s.refresh_token = Some(refresh_token);
                    s.user = Some(user);
                    s.error = None;
                    s.success_message = None;
                }
                None => {
                    s.token = None;
                    s.refresh_token = None;
                    s.user = None;
                    s.error = Some(LOGIN_FAILED.to_string());
                    s.success_message = None;
                }
            }
        });
    }

    /// The network half of login. Persistence stays out of here so a
    /// superseded login can be discarded before it writes anything.
    async fn fetch_login(&self, email: &str, password: &SecretString) -> Option<LoginResponse> {
        self.inner
            .api
            .post_json(
                "/auth/login",
                &json!({ "email": email, "password": password.expose_secret() }),
            )
            .await
            .ok()
    }

    /// Register a new account. Does not authenticate the caller.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
        address: Option<&str>,
    ) {
        let ticket = self.inner.register_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
            s.success_message = None;
        });

        let result: crate::error::Result<RegisterResponse> = self
            .inner
            .api
            .post_json(
                "/auth/register",
                &json!({
                    "name": name,
                    "email": email,
                    "password": password.expose_secret(),
                    "address": address,
                }),
            )
            .await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            match &result {
                Ok(response) => {
                    // Address and role are defaulted; the backend only
                    // reports the basics for a fresh account.
                    s.user = Some(UserProfile {
                        id: response.user.id,
                        name: response.user.name.clone(),
                        email: response.user.email.clone(),
                        address: None,
                        role: None,
                    });
                    s.success_message = Some(REGISTER_OK.to_string());
                    s.error = None;
                }
                Err(err) => {
                    s.user = None;
                    s.success_message = None;
                    s.error = Some(
                        err.server_message()
                            .unwrap_or(REGISTER_FAILED)
                            .to_string(),
                    );
                }
            }
        });
    }

    /// Log out: best-effort server notification, then unconditional local
    /// credential erasure.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let ticket = self.inner.logout_seq.begin();

        if let Err(err) = self.inner.api.post_empty("/auth/logout").await {
            warn!(error = %err, "logout notification failed");
        }

        self.inner.api.session().clear();
        if !ticket.is_current() {
            return;
        }
        self.inner.state.update(|s| *s = AuthState::default());
    }

    /// Clear the error (and any stale success message).
    pub fn clear_error(&self) {
        self.inner.state.update(|s| {
            s.error = None;
            s.success_message = None;
        });
    }

    /// Clear the one-shot registration success message.
    pub fn clear_success_message(&self) {
        self.inner.state.update(|s| s.success_message = None);
    }

    /// Whether the session currently holds a usable access token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(
            self.inner.api.session().status(),
            SessionStatus::Authenticated { .. }
        )
    }
}
