mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use subdomain_registry::api::routes::registry_routes;

async fn seeded_server() -> TestServer {
    let state = common::create_test_state();
    common::insert_all(
        &state,
        &["www.example.com", "api.example.com", "example.com", "www.other.com"],
    )
    .await;

    TestServer::new(registry_routes().with_state(state)).unwrap()
}

#[tokio::test]
async fn test_lookup_returns_labels() {
    let server = seeded_server().await;

    let response = server.get("/lookup/example.com").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["domain"], "example.com");
    assert_eq!(json["full"], false);
    assert_eq!(json["total"], 3);
    assert_eq!(json["items"], json!(["", "api", "www"]));
}

#[tokio::test]
async fn test_lookup_accepts_full_hostname() {
    let server = seeded_server().await;

    let response = server.get("/lookup/deep.www.example.com").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["total"], 3);
}

#[tokio::test]
async fn test_lookup_full_hostnames() {
    let server = seeded_server().await;

    let response = server
        .get("/lookup/example.com")
        .add_query_param("full", "true")
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["full"], true);
    assert_eq!(
        json["items"],
        json!(["api.example.com", "example.com", "www.example.com"])
    );
}

#[tokio::test]
async fn test_lookup_unknown_domain_is_not_found() {
    let server = seeded_server().await;

    let response = server.get("/lookup/unknown.org").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_lookup_public_suffix_is_bad_request() {
    let server = seeded_server().await;

    let response = server.get("/lookup/com").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "invalid_domain");
}
