//! End-to-end pipeline tests: `AuthedClient` over the `reqwest` transport
//! against a local mock server.

use std::sync::Arc;
use std::time::Duration;

use lex_auth::transport::ReqwestTransport;
use lex_auth::{ApiRequest, AuthError, AuthedClient, CredentialStore, FormPart, StoreLocation};
use lex_config::{ApiConfig, StorageConfig};
use lex_core::{Durability, TokenKind, TokenPair};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        request_timeout_secs: 5,
        probe_timeout_secs: 2,
        ..ApiConfig::default()
    }
}

fn client_with_store(api: ApiConfig, store: CredentialStore) -> AuthedClient {
    let transport = ReqwestTransport::from_config(&api).expect("http client");
    AuthedClient::new(Arc::new(store), Arc::new(transport), api)
}

fn seeded_store() -> CredentialStore {
    let store = CredentialStore::in_memory();
    store
        .store_login(
            &TokenPair {
                access: "expired".into(),
                refresh: "r1".into(),
            },
            Durability::Ephemeral,
        )
        .expect("seed");
    store
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_unauthorized_requests_trigger_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/userprofile"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/userprofile"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Aigerim"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh"))
        .and(body_json(json!({"refresh": "r1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": "fresh"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_store(api_for(&server), seeded_store());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .request(ApiRequest::get(client.url("/api/userprofile")))
                    .await
                    .map(|response| response.status)
            })
        })
        .collect();

    for handle in handles {
        let status = handle.await.expect("task").expect("response");
        assert_eq!(status, 200);
    }
    assert_eq!(client.refresher().exchanges_started(), 1);
    assert_eq!(client.store().read(TokenKind::Access).as_deref(), Some("fresh"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_all_see_failed_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/userprofile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(4)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Token is invalid or expired"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_store(api_for(&server), seeded_store());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .request(ApiRequest::get(client.url("/api/userprofile")))
                    .await
                    .map(|response| response.status)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.expect("task").expect("response"), 401);
    }
    assert!(client.store().snapshot().is_empty());
}

#[tokio::test]
async fn login_fetch_logout_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_json(json!({"username": "aigerim", "password": "secret-pass"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a1",
            "refresh": "r1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/userprofile"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Aigerim"})))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::TempDir::new().expect("tmp dir");
    let storage = StorageConfig {
        dir: tmp.path().to_string_lossy().into_owned(),
        ..StorageConfig::default()
    };
    let client = client_with_store(
        api_for(&server),
        CredentialStore::from_config(&storage).expect("store"),
    );

    client
        .login("aigerim", "secret-pass", Durability::Durable)
        .await
        .expect("login");
    assert_eq!(
        client.store().locate(TokenKind::Access),
        Some(StoreLocation::Durable)
    );

    let profile = client
        .request(ApiRequest::get(client.url("/api/userprofile")))
        .await
        .expect("profile");
    assert_eq!(profile.status, 200);

    client.logout();
    assert_eq!(client.store().read(TokenKind::Access), None);
    assert_eq!(client.store().read(TokenKind::Refresh), None);

    // A fresh store over the same directory sees nothing either.
    let reopened = CredentialStore::from_config(&storage).expect("store");
    assert!(!reopened.has_any_token());
}

#[tokio::test]
async fn multipart_keeps_bearer_and_lets_transport_pick_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .and(header("authorization", "Bearer expired"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dialog_id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_store(api_for(&server), seeded_store());
    let response = client
        .request(ApiRequest::post(client.url("/chat/")).multipart(vec![
            FormPart::text("content", "Is this contract valid?"),
            FormPart::file("file", "contract.txt", Some("text/plain".into()), b"terms".to_vec()),
        ]))
        .await
        .expect("response");
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn closed_port_is_network_unreachable() {
    // Bind then release an ephemeral port so nothing listens on it.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("ephemeral port")
        .port();
    let api = ApiConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        request_timeout_secs: 5,
        probe_timeout_secs: 2,
        ..ApiConfig::default()
    };

    let client = client_with_store(api, seeded_store());
    let err = client
        .request(ApiRequest::get(client.url("/api/userprofile")))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::NetworkUnreachable(_)), "{err:?}");
    assert!(matches!(
        client.probe().await,
        Err(AuthError::ServerUnreachable(_))
    ));
    assert_eq!(client.refresher().exchanges_started(), 0);
}
