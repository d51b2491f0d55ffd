//! Integration tests for the HTTP API.
//!
//! These tests verify that the HTTP endpoints work correctly by starting
//! a server and making HTTP requests to it.
#![cfg(feature = "http")]

use fontscape::http::HttpServer;
use fontscape::{Embedding, FontCatalog, FontScape, Metric, ServiceConfig};

fn test_service() -> FontScape {
    let catalog = FontCatalog::from_pairs(vec![
        (
            "Garamond".to_string(),
            Embedding::new(vec![1.0, 0.0, 0.0]).unwrap(),
        ),
        (
            "Bembo".to_string(),
            Embedding::new(vec![0.9, 0.1, 0.0]).unwrap(),
        ),
        (
            "Helvetica".to_string(),
            Embedding::new(vec![0.0, 1.0, 0.1]).unwrap(),
        ),
        (
            "Univers".to_string(),
            Embedding::new(vec![0.1, 0.9, 0.0]).unwrap(),
        ),
    ])
    .unwrap();

    FontScape::build(
        catalog,
        ServiceConfig {
            metrics: vec![Metric::Euclidean, Metric::Angular],
            ..ServiceConfig::default()
        },
    )
    .unwrap()
}

/// Server construction over a built service.
#[tokio::test]
async fn test_http_server_creation() {
    let service = test_service();
    let _server = HttpServer::new(service);
}

/// An unparseable bind address is an error, not a panic.
#[tokio::test]
async fn test_bind_rejects_bad_address() {
    let server = HttpServer::new(test_service());
    assert!(server.bind("not-an-address").await.is_err());
}

/// Integration test that spawns a real HTTP server and makes requests.
/// Marked as ignored because it requires port binding.
#[tokio::test]
#[ignore = "Requires port binding - run manually with: cargo test --test http_api_tests -- --ignored"]
async fn test_http_full_integration() {
    use std::time::Duration;
    use tokio::time::sleep;

    let server = HttpServer::new(test_service());
    let server_handle = tokio::spawn(async move {
        server.bind("127.0.0.1:18417").await.unwrap();
    });

    // Give server time to start
    sleep(Duration::from_millis(200)).await;

    let client = reqwest::Client::new();
    let base = "http://127.0.0.1:18417/api/v1";

    // List fonts
    let fonts: serde_json::Value = client
        .get(format!("{}/fonts", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fonts.as_array().unwrap().len(), 4);
    assert_eq!(fonts[0]["value"], 0);
    assert_eq!(fonts[0]["name"], "Garamond");

    // Nearest neighbors
    let similar: serde_json::Value = client
        .post(format!("{}/fonts/similar", base))
        .json(&serde_json::json!({"font_index": 0, "k": 2}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(similar[0]["name"], "Garamond");
    assert_eq!(similar[1]["name"], "Bembo");

    // Unknown index maps to 404
    let missing = client
        .post(format!("{}/fonts/similar", base))
        .json(&serde_json::json!({"font_index": 99}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    // No decoder attached: interpolation maps to 503
    let interpolation = client
        .post(format!("{}/fonts/interpolate", base))
        .json(&serde_json::json!({
            "font_1_index": 0,
            "font_2_index": 1,
            "interpolation_fraction": 0.5
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(
        interpolation.status(),
        reqwest::StatusCode::SERVICE_UNAVAILABLE
    );

    // 2D map over the whole catalog
    let map: serde_json::Value = client
        .post(format!("{}/map", base))
        .json(&serde_json::json!({"method": "pca"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let nodes = map["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 4);
    assert_eq!(nodes[0]["shape"], "circularImage");
    assert_eq!(nodes[0]["fixed"]["x"], true);

    // Status
    let status: serde_json::Value = client
        .get(format!("{}/status", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["font_count"], 4);
    assert_eq!(status["dimensions"], 3);
    assert_eq!(status["model_attached"], false);

    server_handle.abort();
}
