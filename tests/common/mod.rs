//! Shared fixtures: a wiremock stand-in for the Lakeshore platform.

#![allow(dead_code)]

use std::time::Duration;

use lakeshore_provider::Client;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "T1";

/// Mount a token endpoint answering the client-credentials grant.
pub async fn mount_token(server: &MockServer, token: &str, expires_in: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/v2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in": expires_in,
        })))
        .mount(server)
        .await;
}

/// A mock platform with a working token endpoint.
pub async fn start_platform() -> MockServer {
    let server = MockServer::start().await;
    mount_token(&server, TEST_TOKEN, 3600).await;
    server
}

/// A client against the mock platform with millisecond backoff units, so
/// the retry schedule keeps its shape without the wall-clock cost.
pub fn fast_client(server: &MockServer) -> Client {
    Client::builder(server.uri(), "client-id", "client-secret")
        .auth_backoff(Duration::from_millis(10))
        .rate_limit_backoff(Duration::from_millis(20))
        .build()
        .expect("client")
}

/// The provider configuration block pointing at the mock platform.
pub fn provider_config(server: &MockServer) -> serde_json::Value {
    json!({
        "api_url": server.uri(),
        "client_id": "client-id",
        "client_secret": "client-secret",
    })
}
