//! Retry schedule for rate-limited and rejected requests.
//!
//! The backoff units are shrunk to milliseconds via the builder; the
//! schedule keeps its 1x/2x/3x shape, so elapsed-time assertions scale.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, Request, ResponseTemplate};

use common::{fast_client, start_platform};

#[tokio::test]
async fn rate_limited_twice_then_succeeds_with_growing_delays() {
    let server = start_platform().await;

    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();
    Mock::given(method("GET"))
        .and(path("/public/api/v1/cluster"))
        .respond_with(move |_req: &Request| {
            if hits_clone.fetch_add(1, Ordering::SeqCst) < 2 {
                ResponseTemplate::new(429)
            } else {
                ResponseTemplate::new(200)
                    .set_body_json(json!({"result": [{"clusterId": "c1"}], "nextPageToken": ""}))
            }
        })
        .expect(3)
        .mount(&server)
        .await;

    // fast_client uses a 20ms rate-limit unit: first retry waits 1 unit,
    // the second 2, so the whole call takes at least 60ms.
    let client = fast_client(&server);
    let started = tokio::time::Instant::now();
    let clusters = client.list_clusters().await.expect("clusters");
    assert!(started.elapsed() >= Duration::from_millis(60));
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0]["clusterId"], "c1");
}

#[tokio::test]
async fn rate_limit_budget_exhaustion_is_a_remote_error() {
    let server = start_platform().await;
    Mock::given(method("GET"))
        .and(path("/public/api/v1/cluster/c1"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(4)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let err = client.get_cluster("c1").await.expect_err("exhausted");
    match err {
        lakeshore_provider::Error::Remote { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "slow down");
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_token_budget_exhaustion_is_a_remote_error() {
    let server = start_platform().await;
    Mock::given(method("GET"))
        .and(path("/public/api/v1/user/u1"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(4)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let err = client.get_user("u1").await.expect_err("exhausted");
    match err {
        lakeshore_provider::Error::Remote { status, .. } => assert_eq!(status, 403),
        other => panic!("expected remote error, got {other:?}"),
    }

    // Four data-plane attempts, and a token call per attempt after each
    // invalidation plus the initial acquisition.
    let data_calls = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|req| req.url.path() == "/public/api/v1/user/u1")
        .count();
    assert_eq!(data_calls, 4);
}

#[tokio::test]
async fn not_found_and_server_errors_are_never_retried() {
    let server = start_platform().await;
    Mock::given(method("GET"))
        .and(path("/public/api/v1/role/rX"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/api/v1/role/rY"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    assert!(client.get_role("rX").await.expect_err("404").is_not_found());
    let err = client.get_role("rY").await.expect_err("500");
    assert_eq!(err.status(), Some(500));
}
