//! Session service.
//!
//! Owns the three persisted credential entries and broadcasts
//! authenticated/anonymous transitions to observers. Tokens are never
//! cached in memory - every read goes to the credential store, so a renewal
//! in another code path is immediately visible here.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use secrecy::SecretString;
use thiserror::Error;
use tokio::sync::watch;

use shopkit_core::UserProfile;

use super::token;
use crate::storage::{ACCESS_TOKEN_KEY, CredentialStore, REFRESH_TOKEN_KEY, USER_KEY};

/// Session-level failures.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The refresh token carries no decodable expiry claim.
    #[error("Malformed refresh token")]
    InvalidRefreshToken,
}

/// Observable authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// No usable credentials. For an embedding shell this is the
    /// "navigate to the login entry point" signal.
    Anonymous,
    /// A user is logged in with a non-expired access token.
    Authenticated { user: Option<UserProfile> },
}

struct SessionInner {
    store: Arc<dyn CredentialStore>,
    /// Bumped on every credential write. The refresh coordinator compares
    /// epochs to detect that another flight already renewed.
    epoch: AtomicU64,
    status: watch::Sender<SessionStatus>,
}

/// Explicit session object injected into the HTTP client and pipelines.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create a session over `store`, hydrating status from whatever
    /// credentials survived the last run.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let initial = if store.get(ACCESS_TOKEN_KEY).is_some() {
            SessionStatus::Authenticated {
                user: read_user(store.as_ref()),
            }
        } else {
            SessionStatus::Anonymous
        };
        Self {
            inner: Arc::new(SessionInner {
                store,
                epoch: AtomicU64::new(0),
                status: watch::Sender::new(initial),
            }),
        }
    }

    /// Current access token, read fresh from the store.
    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.inner
            .store
            .get(ACCESS_TOKEN_KEY)
            .map(SecretString::from)
    }

    /// Current refresh token, read fresh from the store.
    #[must_use]
    pub fn refresh_token(&self) -> Option<SecretString> {
        self.inner
            .store
            .get(REFRESH_TOKEN_KEY)
            .map(SecretString::from)
    }

    /// Cached profile of the logged-in user. Corrupted cache reads as absent.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        read_user(self.inner.store.as_ref())
    }

    /// Snapshot of the credential epoch. Requests capture this before
    /// sending so the coordinator can tell a stale failure from a fresh one.
    pub(crate) fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    /// Subscribe to login/logout transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status.subscribe()
    }

    /// Current status snapshot.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.inner.status.borrow().clone()
    }

    /// Persist a fresh login: all three entries under a window derived from
    /// the refresh token's expiry claim.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidRefreshToken` if the refresh token has
    /// no decodable expiry claim - the login is then treated as failed.
    pub fn persist_login(
        &self,
        access_token: &str,
        refresh_token: &str,
        user: &UserProfile,
    ) -> Result<(), SessionError> {
        let exp =
            token::decode_exp(refresh_token).ok_or(SessionError::InvalidRefreshToken)?;
        let ttl = token::minutes_until(exp, Utc::now().timestamp());

        let store = self.inner.store.as_ref();
        store.put(ACCESS_TOKEN_KEY, access_token, ttl);
        store.put(REFRESH_TOKEN_KEY, refresh_token, ttl);
        if let Ok(json) = serde_json::to_string(user) {
            store.put(USER_KEY, &json, ttl);
        }

        self.bump_epoch();
        self.inner.status.send_replace(SessionStatus::Authenticated {
            user: Some(user.clone()),
        });
        Ok(())
    }

    /// Persist a successful renewal: the new access token, plus the refresh
    /// token and cached user re-persisted under the recomputed window.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidRefreshToken` if the stored refresh
    /// token disappeared or lost its expiry claim mid-flight.
    pub(crate) fn persist_refresh(&self, new_access_token: &str) -> Result<(), SessionError> {
        let store = self.inner.store.as_ref();
        let refresh = store
            .get(REFRESH_TOKEN_KEY)
            .ok_or(SessionError::InvalidRefreshToken)?;
        let exp = token::decode_exp(&refresh).ok_or(SessionError::InvalidRefreshToken)?;
        let ttl = token::minutes_until(exp, Utc::now().timestamp());

        store.put(ACCESS_TOKEN_KEY, new_access_token, ttl);
        store.put(REFRESH_TOKEN_KEY, &refresh, ttl);
        if let Some(user) = store.get(USER_KEY) {
            store.put(USER_KEY, &user, ttl);
        }

        self.bump_epoch();
        Ok(())
    }

    /// Erase all persisted credentials and publish `Anonymous`.
    pub fn clear(&self) {
        let store = self.inner.store.as_ref();
        store.erase(ACCESS_TOKEN_KEY);
        store.erase(REFRESH_TOKEN_KEY);
        store.erase(USER_KEY);
        self.bump_epoch();
        self.inner.status.send_replace(SessionStatus::Anonymous);
    }

    /// Whether a non-expired access token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    fn bump_epoch(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

fn read_user(store: &dyn CredentialStore) -> Option<UserProfile> {
    let json = store.get(USER_KEY)?;
    serde_json::from_str(&json).ok()
}
