//! Login, registration and logout against a mock backend.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopkit_client::SessionStatus;
use shopkit_integration_tests::{anonymous_shop, authenticated_shop, fake_jwt, fresh_refresh_token};

#[tokio::test]
async fn login_success_persists_session_and_fills_state() {
    let server = MockServer::start().await;
    let refresh = fresh_refresh_token();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_partial_json(json!({ "email": "ada@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-1",
            "refreshToken": refresh.clone(),
            "user": { "id": 1, "name": "Ada", "email": "ada@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let shop = anonymous_shop(&server);
    let password = SecretString::from("hunter2");
    shop.auth().login("ada@example.com", &password).await;

    let state = shop.auth().state();
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(state.token.as_deref(), Some("access-1"));
    assert_eq!(state.refresh_token.as_deref(), Some(refresh.as_str()));
    assert_eq!(state.user.as_ref().map(|u| u.name.as_str()), Some("Ada"));

    assert!(shop.session().is_authenticated());
    match shop.session().status() {
        SessionStatus::Authenticated { user } => {
            assert_eq!(user.map(|u| u.email), Some("ada@example.com".to_string()));
        }
        SessionStatus::Anonymous => panic!("expected authenticated session"),
    }
}

#[tokio::test]
async fn login_rejection_reads_as_one_fixed_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "bad credentials" })),
        )
        .mount(&server)
        .await;

    let shop = anonymous_shop(&server);
    let password = SecretString::from("wrong");
    shop.auth().login("ada@example.com", &password).await;

    let state = shop.auth().state();
    assert_eq!(
        state.error.as_deref(),
        Some("Invalid email or password. Please try again.")
    );
    assert_eq!(state.token, None);
    assert_eq!(state.user, None);
    assert!(!shop.session().is_authenticated());
}

#[tokio::test]
async fn login_with_undecodable_refresh_token_fails_like_a_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-1",
            "refreshToken": "not-a-jwt",
            "user": { "id": 1, "name": "Ada", "email": "ada@example.com" }
        })))
        .mount(&server)
        .await;

    let shop = anonymous_shop(&server);
    let password = SecretString::from("hunter2");
    shop.auth().login("ada@example.com", &password).await;

    let state = shop.auth().state();
    assert_eq!(
        state.error.as_deref(),
        Some("Invalid email or password. Please try again.")
    );
    assert!(!shop.session().is_authenticated());
}

#[tokio::test]
async fn superseded_login_never_touches_the_credential_store() {
    let server = MockServer::start().await;
    let refresh = fresh_refresh_token();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_partial_json(json!({ "email": "slow@example.com" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_json(json!({
                    "accessToken": "access-slow",
                    "refreshToken": refresh.clone(),
                    "user": { "id": 1, "name": "Slow", "email": "slow@example.com" }
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_partial_json(json!({ "email": "fast@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-fast",
            "refreshToken": refresh.clone(),
            "user": { "id": 2, "name": "Fast", "email": "fast@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let shop = anonymous_shop(&server);
    let password = SecretString::from("hunter2");

    let slow_shop = shop.clone();
    let slow = tokio::spawn(async move {
        let password = SecretString::from("hunter2");
        slow_shop.auth().login("slow@example.com", &password).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    shop.auth().login("fast@example.com", &password).await;
    slow.await.unwrap();

    // The later login wins everywhere; the slow response lands after it
    // completed and must not overwrite state or stored credentials.
    let state = shop.auth().state();
    assert_eq!(state.token.as_deref(), Some("access-fast"));
    assert_eq!(state.user.as_ref().map(|u| u.name.as_str()), Some("Fast"));
    assert_eq!(
        shop.session()
            .access_token()
            .map(|t| t.expose_secret().to_string()),
        Some("access-fast".to_string())
    );
    assert_eq!(
        shop.session().current_user().map(|u| u.email),
        Some("fast@example.com".to_string())
    );
}

#[tokio::test]
async fn register_success_sets_fixed_message_without_authenticating() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_partial_json(json!({ "name": "Ada" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "user": { "id": 7, "name": "Ada", "email": "ada@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let shop = anonymous_shop(&server);
    let password = SecretString::from("hunter2");
    shop.auth()
        .register("Ada", "ada@example.com", &password, None)
        .await;

    let state = shop.auth().state();
    assert_eq!(state.success_message.as_deref(), Some("Registration successful!"));
    assert_eq!(state.error, None);
    assert_eq!(state.user.as_ref().map(|u| u.name.as_str()), Some("Ada"));
    assert!(!shop.session().is_authenticated());
}

#[tokio::test]
async fn register_failure_prefers_server_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({ "message": "Email already registered" })),
        )
        .mount(&server)
        .await;

    let shop = anonymous_shop(&server);
    let password = SecretString::from("hunter2");
    shop.auth()
        .register("Ada", "ada@example.com", &password, None)
        .await;

    assert_eq!(
        shop.auth().state().error.as_deref(),
        Some("Email already registered")
    );
}

#[tokio::test]
async fn register_failure_without_message_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "" })))
        .mount(&server)
        .await;

    let shop = anonymous_shop(&server);
    let password = SecretString::from("hunter2");
    shop.auth()
        .register("Ada", "ada@example.com", &password, None)
        .await;

    assert_eq!(
        shop.auth().state().error.as_deref(),
        Some("Registration failed. Please check your details and try again.")
    );
}

#[tokio::test]
async fn logout_erases_credentials_even_when_the_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let access = fake_jwt(chrono::Utc::now().timestamp() + 600);
    let shop = authenticated_shop(&server, &access, &fresh_refresh_token());
    assert!(shop.session().is_authenticated());

    shop.auth().logout().await;

    assert!(!shop.session().is_authenticated());
    assert_eq!(shop.session().access_token().is_some(), false);
    assert_eq!(shop.auth().state().token, None);
    assert!(matches!(shop.session().status(), SessionStatus::Anonymous));
}
