//! Route guard against a mock API

use mockall::mock;
use mockall::predicate::eq;
use serde_json::json;
use shopfront_core::{Credentials, Location, Navigator};
use shopfront_frontend_common::{GuardDecision, RouteGuard, SessionStore};
use shopfront_http::{ApiClient, MemoryTokenStore};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mock! {
    pub Nav {}

    impl Navigator for Nav {
        fn navigate(&self, location: Location);
    }
}

async fn server_with_user() -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "a@b.com",
            "fullName": "A B",
            "roles": ["ROLE_USER"]
        })))
        .mount(&mock_server)
        .await;
    mock_server
}

fn guard(uri: String, credentials: Option<Credentials>) -> RouteGuard {
    let tokens = match credentials {
        Some(credentials) => MemoryTokenStore::with_credentials(credentials),
        None => MemoryTokenStore::new(),
    };
    let client = ApiClient::builder()
        .base_url(uri)
        .token_store(Arc::new(tokens))
        .build()
        .unwrap();
    RouteGuard::new(SessionStore::new(client))
}

#[tokio::test]
async fn test_every_navigation_reverifies_session() {
    let mock_server = server_with_user().await;
    let guard = guard(mock_server.uri(), Some(Credentials::new("T1", "R1")));

    assert_eq!(guard.before_each("/cart").await, GuardDecision::Allow);
    assert_eq!(guard.before_each("/products").await, GuardDecision::Allow);

    let checks = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/auth/me")
        .count();
    assert_eq!(checks, 2);
}

#[tokio::test]
async fn test_authenticated_user_is_sent_home_from_guest_pages() {
    let mock_server = server_with_user().await;
    let guard = guard(mock_server.uri(), Some(Credentials::new("T1", "R1")));

    assert_eq!(
        guard.before_each("/login").await,
        GuardDecision::Redirect(Location::home())
    );
    assert_eq!(
        guard.before_each("/forgot-password").await,
        GuardDecision::Redirect(Location::home())
    );
    assert_eq!(guard.before_each("/reset-password").await, GuardDecision::Allow);
}

#[tokio::test]
async fn test_anonymous_user_is_sent_to_login() {
    let mock_server = server_with_user().await;
    let guard = guard(mock_server.uri(), None);

    let mut navigator = MockNav::new();
    navigator
        .expect_navigate()
        .with(eq(Location::login_with_redirect("/checkout?step=2")))
        .times(1)
        .return_const(());

    assert!(!guard.navigate("/checkout?step=2", &navigator).await);
    assert!(guard.navigate("/about", &navigator).await);

    // Without a token the guard never asks the server
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
