//! Token refresh and replay behaviour

use mockall::mock;
use serde_json::json;
use shopfront_core::{Credentials, Location, Navigator};
use shopfront_http::{
    ApiClient, AuthEvent, ClientError, MemoryTokenStore, TokenKind, TokenStore,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mock! {
    pub Nav {}

    impl Navigator for Nav {
        fn navigate(&self, location: Location);
    }
}

fn cart_body() -> serde_json::Value {
    json!({"items": [], "total": 0.0})
}

fn build_client(
    uri: String,
    store: Arc<MemoryTokenStore>,
    navigator: Option<Arc<dyn Navigator>>,
) -> ApiClient {
    let mut builder = ApiClient::builder().base_url(uri).token_store(store);
    if let Some(navigator) = navigator {
        builder = builder.navigator(navigator);
    }
    builder.build().unwrap()
}

fn seeded_store() -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_credentials(Credentials::new(
        "T-old", "R1",
    )))
}

#[tokio::test]
async fn test_single_refresh_then_single_replay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("authorization", "Bearer T-old"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refreshToken": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T-new"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("authorization", "Bearer T-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = seeded_store();
    let client = build_client(mock_server.uri(), Arc::clone(&store), None);

    let cart = client.get_cart().await.unwrap();
    assert!(cart.items.is_empty());

    let order: Vec<String> = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect();
    assert_eq!(
        order,
        vec!["GET /api/cart", "POST /api/auth/refresh", "GET /api/cart"]
    );

    // Refresh token is reused when the server does not rotate it
    assert_eq!(store.credentials(), Some(Credentials::new("T-new", "R1")));
}

#[tokio::test]
async fn test_rotated_refresh_token_is_stored() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer T-old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "T-new", "refreshToken": "R2"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // The replay of an auth endpoint keeps its no-cache headers
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer T-new"))
        .and(header("cache-control", "no-cache, no-store, must-revalidate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "a@b.com",
            "fullName": "A B",
            "roles": "ROLE_ADMIN"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = seeded_store();
    let client = build_client(mock_server.uri(), Arc::clone(&store), None);

    client.current_user().await.unwrap();
    assert_eq!(store.credentials(), Some(Credentials::new("T-new", "R2")));
}

#[tokio::test]
async fn test_refresh_failure_ends_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"message": "Refresh token revoked"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut navigator = MockNav::new();
    navigator
        .expect_navigate()
        .withf(|location| *location == Location::login())
        .times(1)
        .return_const(());

    let store = seeded_store();
    let client = build_client(
        mock_server.uri(),
        Arc::clone(&store),
        Some(Arc::new(navigator)),
    );

    let expired = Arc::new(AtomicUsize::new(0));
    let _subscription = {
        let expired = Arc::clone(&expired);
        client.events().subscribe(move |event| {
            if event == AuthEvent::SessionExpired {
                expired.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    let err = client.get_cart().await.unwrap_err();
    match err {
        ClientError::RefreshFailed(inner) => {
            assert!(matches!(*inner, ClientError::Forbidden(ref m) if m == "Refresh token revoked"));
        }
        other => panic!("Expected RefreshFailed, got {other:?}"),
    }

    assert_eq!(store.get(TokenKind::Access), None);
    assert_eq!(store.get(TokenKind::Refresh), None);
    assert_eq!(expired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_replay_is_never_retried_twice() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T-new"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = seeded_store();
    let client = build_client(mock_server.uri(), Arc::clone(&store), None);

    let err = client.get_cart().await.unwrap_err();
    assert!(matches!(err, ClientError::AuthenticationFailed(_)));
    // The refresh itself succeeded, so the session survives
    assert_eq!(store.get(TokenKind::Access).as_deref(), Some("T-new"));
}

#[tokio::test]
async fn test_no_session_propagates_original_401() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(401).set_body_string("login required"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = build_client(mock_server.uri(), Arc::new(MemoryTokenStore::new()), None);

    match client.get_cart().await {
        Err(ClientError::AuthenticationFailed(message)) => assert_eq!(message, "login required"),
        other => panic!("Expected AuthenticationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_credentials_do_not_trigger_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Bad credentials"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = seeded_store();
    let client = build_client(mock_server.uri(), Arc::clone(&store), None);

    let err = client
        .login(&shopfront_core::LoginRequest {
            email: "a@b.com".into(),
            password: "wrong".into(),
            remember_me: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::AuthenticationFailed(ref m) if m == "Bad credentials"));
    assert!(store.credentials().is_some());
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer T-old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(3)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "T-new"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("authorization", "Bearer T-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body()))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .and(header("authorization", "Bearer T-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "a@b.com"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = build_client(mock_server.uri(), seeded_store(), None);

    let (first, second, third) = tokio::join!(
        client.get_cart(),
        client.get_cart(),
        client.get_profile()
    );
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert!(third.is_ok());
}

#[tokio::test]
async fn test_concurrent_waiters_share_refresh_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"message": "revoked"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = seeded_store();
    let client = build_client(mock_server.uri(), Arc::clone(&store), None);

    let (first, second) = tokio::join!(client.get_cart(), client.get_cart());

    let (first, second) = match (first.unwrap_err(), second.unwrap_err()) {
        (ClientError::RefreshFailed(a), ClientError::RefreshFailed(b)) => (a, b),
        other => panic!("Expected two RefreshFailed errors, got {other:?}"),
    };
    assert!(Arc::ptr_eq(&first, &second));
    assert!(matches!(*first, ClientError::Forbidden(ref m) if m == "revoked"));
    assert!(store.credentials().is_none());
}

#[tokio::test]
async fn test_logout_while_waiting_reports_session_expired() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "revoked"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = seeded_store();
    let client = build_client(mock_server.uri(), Arc::clone(&store), None);

    // A failed refresh for an earlier session must not leak into a later one
    let err = client.get_cart().await.unwrap_err();
    assert!(matches!(err, ClientError::RefreshFailed(_)));

    mock_server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T3"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    store.set(&Credentials::new("T2", "R2")).unwrap();
    let request = client.get_cart();
    let logout = async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        store.clear().unwrap();
    };
    let (result, ()) = tokio::join!(request, logout);

    assert!(matches!(result.unwrap_err(), ClientError::SessionExpired));
}
