//! Single-flight credential renewal.
//!
//! Any intercepted authentication failure lands here. The coordinator
//! decides between renewing (refresh token present with a future expiry
//! claim) and forcing a logout (anything else), and guarantees at most one
//! renewal call is in flight at a time: concurrent failures queue on the
//! flight lock and inherit the first flight's outcome.

use chrono::Utc;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::session::Session;
use super::token;

/// Path of the token-renewal endpoint. Requests to it are authenticated
/// with the refresh token instead of the access token.
pub(crate) const REFRESH_PATH: &str = "/auth/refresh";

/// What became of an intercepted authentication failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Credentials were renewed (by this flight or a concurrent one);
    /// the failed request should be retried once with the new token.
    Renewed,
    /// Renewal was impossible or failed; the session has been cleared and
    /// the original failure should surface.
    LoggedOut,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

/// Coordinates token renewal between concurrently failing requests.
pub struct RefreshCoordinator {
    http: reqwest::Client,
    refresh_url: String,
    session: Session,
    flight: Mutex<()>,
}

impl RefreshCoordinator {
    pub(crate) fn new(http: reqwest::Client, base_url: &str, session: Session) -> Self {
        Self {
            http,
            refresh_url: format!("{base_url}{REFRESH_PATH}"),
            session,
            flight: Mutex::new(()),
        }
    }

    /// Handle an authentication failure observed by a request that was sent
    /// under `observed_epoch`.
    ///
    /// Holding the flight lock across the whole evaluation serializes
    /// renewals; the epoch comparison lets late arrivals piggyback on a
    /// renewal that completed while they were queued.
    #[instrument(skip(self))]
    pub(crate) async fn on_auth_failure(&self, observed_epoch: u64) -> RefreshOutcome {
        let _flight = self.flight.lock().await;

        if self.session.epoch() != observed_epoch {
            // Credentials changed while we were queued: either a concurrent
            // flight renewed them or a logout raced us.
            return if self.session.is_authenticated() {
                debug!("renewal already completed by a concurrent flight");
                RefreshOutcome::Renewed
            } else {
                RefreshOutcome::LoggedOut
            };
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            info!("no refresh token; forcing logout");
            self.session.clear();
            return RefreshOutcome::LoggedOut;
        };

        let now = Utc::now().timestamp();
        match token::decode_exp(refresh_token.expose_secret()) {
            Some(exp) if exp > now => {}
            _ => {
                // Expired or undecodable claim: never call the backend.
                info!("refresh token expired or malformed; forcing logout");
                self.session.clear();
                return RefreshOutcome::LoggedOut;
            }
        }

        match self.renew(&refresh_token).await {
            Ok(new_access) => {
                if self.session.persist_refresh(&new_access).is_ok() {
                    debug!("credentials renewed");
                    RefreshOutcome::Renewed
                } else {
                    warn!("renewed token could not be persisted; forcing logout");
                    self.session.clear();
                    RefreshOutcome::LoggedOut
                }
            }
            Err(err) => {
                warn!(error = %err, "token renewal failed; forcing logout");
                self.session.clear();
                RefreshOutcome::LoggedOut
            }
        }
    }

    /// Issue the one renewal call, authenticated with the refresh token.
    async fn renew(&self, refresh_token: &SecretString) -> Result<String, RenewError> {
        let response = self
            .http
            .post(&self.refresh_url)
            .bearer_auth(refresh_token.expose_secret())
            .send()
            .await
            .map_err(RenewError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenewError::Status(status));
        }

        let body: RefreshResponse = response.json().await.map_err(RenewError::Transport)?;
        Ok(body.access_token)
    }
}

#[derive(Debug, thiserror::Error)]
enum RenewError {
    #[error("renewal request failed: {0}")]
    Transport(reqwest::Error),
    #[error("renewal rejected with status {0}")]
    Status(StatusCode),
}
