//! HTTP tests for the list screen.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`ws-cli migrate`, `ws-cli seed`)
//! - The web server running (cargo run -p weekly-shop-web)
//!
//! They share one database, so run them with `--test-threads=1`.

use reqwest::{Client, StatusCode, redirect::Policy};
use weekly_shop_integration_tests::base_url;

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_health() {
    let resp = client()
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to reach server");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Failed to read body"), "ok");
}

#[tokio::test]
#[ignore = "Requires running web server and database"]
async fn test_readiness() {
    let resp = client()
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("Failed to reach server");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running web server and database"]
async fn test_list_page_renders() {
    let resp = client()
        .get(format!("{}/", base_url()))
        .send()
        .await
        .expect("Failed to get list page");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("id=\"list-view\""));
    assert!(body.contains("Current List") || body.contains("No Shopping List for This Week"));
}

#[tokio::test]
#[ignore = "Requires running web server and database"]
async fn test_create_redirects_and_flashes() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .post(format!("{base_url}/list"))
        .form(&[("q", "")])
        .send()
        .await
        .expect("Failed to post create");

    // 303 back to the list when created, 409 if this week already has one
    assert!(
        resp.status() == StatusCode::SEE_OTHER || resp.status() == StatusCode::CONFLICT,
        "unexpected status {}",
        resp.status()
    );

    if resp.status() == StatusCode::SEE_OTHER {
        let body = client
            .get(format!("{base_url}/"))
            .send()
            .await
            .expect("Failed to follow redirect")
            .text()
            .await
            .expect("Failed to read body");
        assert!(body.contains("New shopping list created"));
    }
}

#[tokio::test]
#[ignore = "Requires running web server and database"]
async fn test_htmx_request_gets_fragment() {
    let resp = client()
        .get(format!("{}/?q=milk", base_url()))
        .header("HX-Request", "true")
        .send()
        .await
        .expect("Failed to get fragment");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");
    assert!(!body.contains("<!DOCTYPE html>"));
    assert!(body.contains("id=\"list-view\""));
}

#[tokio::test]
#[ignore = "Requires running web server and database"]
async fn test_invalid_quantity_is_rejected() {
    let resp = client()
        .post(format!("{}/list/items/1/quantity", base_url()))
        .form(&[("quantity", "-3")])
        .send()
        .await
        .expect("Failed to post quantity");

    assert!(resp.status().is_client_error());
}
