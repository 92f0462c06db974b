//! Shared setup for HTTP-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use backend_resources::test_util::{test_config, test_jwks, InMemoryIdentityProvider};
use backend_resources::{AppState, JwksClient, UserService};
use http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestApp {
    pub state: Arc<AppState>,
    pub provider: Arc<InMemoryIdentityProvider>,
    pub issuer: String,
    // Keeps the mocked issuer alive for JWKS refreshes.
    _issuer_server: MockServer,
}

/// Mocked Keycloak realm publishing OIDC discovery and the test JWKS.
async fn mock_issuer() -> (MockServer, String) {
    let server = MockServer::start().await;
    let issuer = format!("{}/realms/ITM", server.uri());

    Mock::given(method("GET"))
        .and(path("/realms/ITM/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": issuer,
            "jwks_uri": format!("{}/protocol/openid-connect/certs", issuer)
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/realms/ITM/protocol/openid-connect/certs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_jwks()))
        .mount(&server)
        .await;

    (server, issuer)
}

pub async fn setup() -> TestApp {
    let (server, issuer) = mock_issuer().await;

    let jwks_client = JwksClient::new(&issuer, None).await.unwrap();
    let provider = Arc::new(InMemoryIdentityProvider::new());

    let state = Arc::new(AppState {
        config: test_config(&issuer),
        jwks_client,
        user_service: UserService::new(provider.clone()),
    });

    TestApp {
        state,
        provider,
        issuer,
        _issuer_server: server,
    }
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    match body {
        Some(body) => {
            send_raw(app, method, uri, token, &body.to_string(), Some("application/json")).await
        }
        None => send_raw(app, method, uri, token, "", None).await,
    }
}

/// Send a body exactly as given, with an optional `Content-Type`.
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &str,
    content_type: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    if let Some(content_type) = content_type {
        builder = builder.header("Content-Type", content_type);
    }

    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, value)
}

pub fn valid_user_request() -> Value {
    json!({
        "username": "username_TestUser",
        "email": "email_test@example.com",
        "password": "password_",
        "firstName": "firstName_",
        "lastName": "lastName_"
    })
}
