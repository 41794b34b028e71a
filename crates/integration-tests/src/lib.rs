//! Shared helpers for the Shopkit client integration tests.
//!
//! Every test drives a real [`Shopkit`] instance against a `wiremock`
//! server, with credentials held in a [`MemoryStore`]. Tokens are unsigned
//! JWT-shaped strings; only the `exp` claim matters to the client.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use wiremock::MockServer;

use shopkit_client::{ApiConfig, MemoryStore, Shopkit};
use shopkit_core::{UserId, UserProfile};

/// Build a JWT-shaped token whose payload carries the given `exp` claim.
/// The signature is junk; the client never verifies it.
#[must_use]
pub fn fake_jwt(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
    format!("{header}.{payload}.sig")
}

/// A refresh token expiring one hour from now.
#[must_use]
pub fn fresh_refresh_token() -> String {
    fake_jwt(chrono::Utc::now().timestamp() + 3600)
}

#[must_use]
pub fn test_profile() -> UserProfile {
    UserProfile {
        id: UserId::new(1),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        address: None,
        role: None,
    }
}

/// A client over the mock server with an empty in-memory credential store.
#[must_use]
pub fn anonymous_shop(server: &MockServer) -> Shopkit {
    let config = ApiConfig::new(&server.uri()).expect("valid mock server url");
    Shopkit::new(&config, Arc::new(MemoryStore::new())).expect("client construction")
}

/// A client over the mock server with a live session already persisted.
#[must_use]
pub fn authenticated_shop(server: &MockServer, access_token: &str, refresh_token: &str) -> Shopkit {
    let shop = anonymous_shop(server);
    shop.session()
        .persist_login(access_token, refresh_token, &test_profile())
        .expect("seed session");
    shop
}
