//! Cursor pagination: page merging, token propagation, and query joins.

mod common;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use common::{fast_client, start_platform};

#[tokio::test]
async fn pages_are_fetched_in_order_and_merged() {
    let server = start_platform().await;

    // The page-two mock is more specific, so it gets the higher priority.
    Mock::given(method("GET"))
        .and(path("/public/api/v1/user"))
        .and(query_param("pageToken", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{"userId": "u3"}],
            "nextPageToken": ""
        })))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/api/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{"userId": "u1"}, {"userId": "u2"}],
            "nextPageToken": "p2"
        })))
        .expect(1)
        .with_priority(2)
        .mount(&server)
        .await;

    let users = fast_client(&server).list_users().await.expect("users");
    let ids: Vec<&str> = users.iter().map(|u| u["userId"].as_str().unwrap()).collect();
    assert_eq!(ids, ["u1", "u2", "u3"]);
}

#[tokio::test]
async fn missing_next_page_token_ends_the_scan() {
    let server = start_platform().await;
    Mock::given(method("GET"))
        .and(path("/public/api/v1/role"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{"roleId": "r1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let roles = fast_client(&server).list_roles().await.expect("roles");
    assert_eq!(roles.len(), 1);
}

#[tokio::test]
async fn cursor_joins_with_ampersand_when_the_path_has_a_query() {
    let server = start_platform().await;
    Mock::given(method("GET"))
        .and(path("/public/api/v1/cluster"))
        .and(query_param("limit", "1"))
        .and(query_param("pageToken", "t 2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{"clusterId": "c2"}],
            "nextPageToken": ""
        })))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/api/v1/cluster"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{"clusterId": "c1"}],
            "nextPageToken": "t 2"
        })))
        .expect(1)
        .with_priority(2)
        .mount(&server)
        .await;

    let items = fast_client(&server)
        .get_paginated("/public/api/v1/cluster?limit=1")
        .await
        .expect("paged");
    assert_eq!(items.len(), 2);

    // The token must be percent-encoded on the wire.
    let raw_paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|req| req.url.path() == "/public/api/v1/cluster")
        .map(|req| format!("{}?{}", req.url.path(), req.url.query().unwrap_or("")))
        .collect();
    assert!(raw_paths
        .iter()
        .any(|p| p.contains("limit=1&pageToken=t%202")));
}

#[tokio::test]
async fn a_failing_page_fails_the_whole_listing() {
    let server = start_platform().await;
    Mock::given(method("GET"))
        .and(path("/public/api/v1/catalog"))
        .and(query_param("pageToken", "p2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("page store down"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/api/v1/catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{"catalogId": "cat1"}],
            "nextPageToken": "p2"
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    let err = fast_client(&server)
        .list_catalogs()
        .await
        .expect_err("mid-stream failure");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn pagination_ignores_requests_without_results() {
    let server = start_platform().await;
    Mock::given(method("GET"))
        .and(path("/public/api/v1/tag"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let tags = fast_client(&server).list_tags().await.expect("tags");
    assert!(tags.is_empty());
}

#[tokio::test]
async fn no_content_listing_yields_an_empty_collection() {
    let server = start_platform().await;
    Mock::given(method("GET"))
        .and(path("/public/api/v1/dataProduct"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let products = fast_client(&server)
        .list_data_products()
        .await
        .expect("products");
    assert!(products.is_empty());
}
