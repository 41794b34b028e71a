//! Credential renewal: 401 interception, single-flight, and forced logout.
//!
//! Mocks discriminate on the bearer token, so the old credential always
//! fails and the renewed one always succeeds regardless of interleaving.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopkit_client::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};
use shopkit_client::{ApiConfig, CredentialStore, MemoryStore, SessionStatus, Shopkit};
use shopkit_integration_tests::{authenticated_shop, fake_jwt, fresh_refresh_token, test_profile};

const OLD_ACCESS: &str = "old-access";
const NEW_ACCESS: &str = "new-access";

fn old_bearer() -> String {
    format!("Bearer {OLD_ACCESS}")
}

fn new_bearer() -> String {
    format!("Bearer {NEW_ACCESS}")
}

async fn mount_refresh(server: &MockServer, refresh_token: &str, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(header("authorization", format!("Bearer {refresh_token}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": NEW_ACCESS }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn stale_credential_is_renewed_once_and_the_request_retried() {
    let server = MockServer::start().await;
    let refresh = fresh_refresh_token();

    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header("authorization", old_bearer()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header("authorization", new_bearer()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "productId": 3, "name": "Mug", "price": 12.5, "quantity": 2 }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, &refresh, 1).await;

    let shop = authenticated_shop(&server, OLD_ACCESS, &refresh);
    shop.cart().fetch().await;

    let state = shop.cart().state();
    assert_eq!(state.error, None);
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].name, "Mug");
    assert!(shop.session().is_authenticated());
}

#[tokio::test]
async fn concurrent_failures_share_one_renewal() {
    let server = MockServer::start().await;
    let refresh = fresh_refresh_token();

    for endpoint in ["/cart", "/categories"] {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(header("authorization", old_bearer()))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(header("authorization", new_bearer()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
    }
    mount_refresh(&server, &refresh, 1).await;

    let shop = authenticated_shop(&server, OLD_ACCESS, &refresh);
    tokio::join!(shop.cart().fetch(), shop.categories().fetch_all());

    assert_eq!(shop.cart().state().error, None);
    assert_eq!(shop.categories().state().error, None);
    assert!(shop.session().is_authenticated());
}

#[tokio::test]
async fn expired_refresh_token_logs_out_without_calling_the_backend() {
    let server = MockServer::start().await;
    let expired_refresh = fake_jwt(chrono::Utc::now().timestamp() - 60);

    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    // Seed the store directly: the refresh token is still retrievable but
    // its expiry claim is in the past.
    let store = Arc::new(MemoryStore::new());
    store.put(ACCESS_TOKEN_KEY, OLD_ACCESS, 60);
    store.put(REFRESH_TOKEN_KEY, &expired_refresh, 60);
    let profile = serde_json::to_string(&test_profile()).expect("serialize profile");
    store.put(USER_KEY, &profile, 60);

    let config = ApiConfig::new(&server.uri()).expect("valid mock server url");
    let shop = Shopkit::new(&config, store).expect("client construction");
    assert!(shop.session().is_authenticated());

    shop.cart().fetch().await;

    assert!(shop.cart().state().error.is_some());
    assert!(!shop.session().is_authenticated());
    assert!(matches!(shop.session().status(), SessionStatus::Anonymous));
    assert!(shop.session().access_token().is_none());
}

#[tokio::test]
async fn rejected_renewal_forces_logout() {
    let server = MockServer::start().await;
    let refresh = fresh_refresh_token();

    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header("authorization", old_bearer()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "expired" })))
        .expect(1)
        .mount(&server)
        .await;

    let shop = authenticated_shop(&server, OLD_ACCESS, &refresh);
    shop.cart().fetch().await;

    assert_eq!(shop.cart().state().error.as_deref(), Some("Unauthorized"));
    assert!(!shop.session().is_authenticated());
    assert!(shop.session().refresh_token().is_none());
}

#[tokio::test]
async fn non_auth_errors_pass_through_untouched() {
    let server = MockServer::start().await;
    let refresh = fresh_refresh_token();

    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "database down" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let shop = authenticated_shop(&server, OLD_ACCESS, &refresh);
    shop.cart().fetch().await;

    assert_eq!(shop.cart().state().error.as_deref(), Some("database down"));
    // Business failures never tear the session down.
    assert!(shop.session().is_authenticated());
}
