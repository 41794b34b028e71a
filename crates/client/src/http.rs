//! Authenticated request execution.
//!
//! Every outgoing request reads its bearer token fresh from the session:
//! the renewal endpoint gets the refresh token, everything else the access
//! token. A 401 response is handed to the refresh coordinator together with
//! the credential epoch the request was sent under; if the coordinator
//! reports renewed credentials the request is rebuilt and resent exactly
//! once. Any other error status surfaces untouched and is never retried.

use std::sync::Arc;

use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::auth::refresh::REFRESH_PATH;
use crate::auth::{RefreshCoordinator, RefreshOutcome, Session};
use crate::config::ApiConfig;
use crate::error::{ApiError, Result};

/// Error payload shape the backend uses for business failures.
#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

struct ApiClientInner {
    http: reqwest::Client,
    /// Base URL with no trailing slash.
    base_url: String,
    session: Session,
    refresh: RefreshCoordinator,
}

/// HTTP client for the storefront backend.
///
/// Cheap to clone; all clones share one connection pool, session, and
/// refresh coordinator.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

impl ApiClient {
    /// Build a client from config and an existing session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: &ApiConfig, session: Session) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()?;

        let base_url = config.base_url.as_str().trim_end_matches('/').to_string();
        let refresh = RefreshCoordinator::new(http.clone(), &base_url, session.clone());

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                session,
                refresh,
            }),
        })
    }

    /// The session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    // =========================================================================
    // Typed sugar
    // =========================================================================

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        let response = self
            .send_with(path, |http, url| http.get(url).query(query))
            .await?;
        Self::read_json(response).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = to_json_value(body)?;
        let response = self
            .send_with(path, |http, url| http.post(url).json(&body))
            .await?;
        Self::read_json(response).await
    }

    pub(crate) async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = to_json_value(body)?;
        let response = self
            .send_with(path, |http, url| http.put(url).json(&body))
            .await?;
        Self::read_json(response).await
    }

    /// POST with no payload, discarding the response body.
    pub(crate) async fn post_empty(&self, path: &str) -> Result<()> {
        self.send_with(path, |http, url| http.post(url)).await?;
        Ok(())
    }

    /// DELETE, discarding the response body.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.send_with(path, |http, url| http.delete(url)).await?;
        Ok(())
    }

    /// Send a multipart request, rebuilding the form from owned parts on
    /// the post-renewal retry (multipart bodies are not cloneable).
    pub(crate) async fn send_multipart<T, F>(
        &self,
        method: Method,
        path: &str,
        make_form: F,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::multipart::Form,
    {
        let response = self
            .send_with(path, |http, url| {
                http.request(method.clone(), url).multipart(make_form())
            })
            .await?;
        Self::read_json(response).await
    }

    // =========================================================================
    // Core send path
    // =========================================================================

    /// Send a request built by `build`, intercepting authentication
    /// failures through the refresh coordinator.
    #[instrument(skip(self, build), fields(path = %path))]
    async fn send_with<F>(&self, path: &str, build: F) -> Result<Response>
    where
        F: Fn(&reqwest::Client, String) -> reqwest::RequestBuilder,
    {
        let epoch = self.inner.session.epoch();
        let response = self.dispatch(path, &build).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::check_status(response).await;
        }

        debug!("authentication failure intercepted");
        match self.inner.refresh.on_auth_failure(epoch).await {
            RefreshOutcome::Renewed => {
                // Exactly one retry with the renewed access token.
                let retried = self.dispatch(path, &build).await?;
                Self::check_status(retried).await
            }
            RefreshOutcome::LoggedOut => Err(ApiError::Unauthorized),
        }
    }

    async fn dispatch<F>(&self, path: &str, build: &F) -> Result<Response>
    where
        F: Fn(&reqwest::Client, String) -> reqwest::RequestBuilder,
    {
        let url = format!("{}{}", self.inner.base_url, path);
        let mut request = build(&self.inner.http, url);
        if let Some(token) = self.bearer_for(path) {
            request = request.bearer_auth(token.expose_secret());
        }
        request.send().await.map_err(ApiError::from)
    }

    /// The bearer credential for a target path: the renewal endpoint is
    /// authenticated with the refresh token, everything else with the
    /// access token. Both are read fresh from the store per request.
    fn bearer_for(&self, path: &str) -> Option<SecretString> {
        if path.starts_with(REFRESH_PATH) {
            self.inner.session.refresh_token()
        } else {
            self.inner.session.access_token()
        }
    }

    /// Turn a non-2xx response into `ApiError::Api` with the
    /// server-supplied message when the body carries one.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(ErrorBody { message: Some(m) }) if !m.is_empty() => Some(m),
            _ => None,
        };
        warn!(status = %status, message = ?message, "request rejected");
        Err(ApiError::Api { status, message })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn to_json_value<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}
