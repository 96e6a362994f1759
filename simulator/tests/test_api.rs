//! Integration tests for the HTTP API endpoints.
//!
//! Uses axum's oneshot pattern (via tower::ServiceExt), no TCP binding needed.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use failure_sim::server::{create_router, create_router_with, ServerConfig};

/// Parse response body as JSON.
async fn body_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    (status, body_json(resp.into_body()).await)
}

// ── GET /health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_200() {
    let (status, json) = get(create_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "OK");
}

// ── GET /simulate ────────────────────────────────────────────────────

#[tokio::test]
async fn simulate_defaults() {
    let (status, json) = get(create_router(), "/simulate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["trials"], 50);
    assert_eq!(json["summary"]["count"], 1000);
    assert_eq!(json["scenario"]["mode"], "exceeds");
    assert!(json["summary"]["histogram"]["bins"].is_array());
}

#[tokio::test]
async fn simulate_with_deploys_and_seed() {
    let uri = "/simulate?features=10&deploys=15&probability=5&simulations=5000&threshold=5&mode=ge&seed=42";
    let (status, json) = get(create_router(), uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["trials"], 150);
    assert_eq!(json["scenario"]["mode"], "at_least");
    let mean = json["summary"]["mean"].as_f64().unwrap();
    assert!((mean - 7.5).abs() < 0.3, "mean={mean}");

    let (_, again) = get(create_router(), uri).await;
    assert_eq!(json["summary"], again["summary"]);
}

#[tokio::test]
async fn simulate_histogram_sums_to_count() {
    let (status, json) = get(create_router(), "/simulate?simulations=2000&seed=1").await;
    assert_eq!(status, StatusCode::OK);
    let total: u64 = json["summary"]["histogram"]["bins"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["count"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 2000);
}

#[tokio::test]
async fn simulate_probability_out_of_range() {
    let (status, json) = get(create_router(), "/simulate?probability=150").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("failure_probability"));
}

#[tokio::test]
async fn simulate_slider_bounds_enforced() {
    let (status, _) = get(create_router(), "/simulate?features=500").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(create_router(), "/simulate?simulations=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn simulate_bounds_can_be_lifted() {
    let app = create_router_with(ServerConfig {
        enforce_input_bounds: false,
    });
    let (status, json) = get(app, "/simulate?features=500&simulations=10&seed=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["trials"], 500);

    // Mathematical preconditions still hold.
    let app = create_router_with(ServerConfig {
        enforce_input_bounds: false,
    });
    let (status, json) = get(app, "/simulate?simulations=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("count"));
}

#[tokio::test]
async fn simulate_invalid_mode() {
    let (status, json) = get(create_router(), "/simulate?mode=sometimes").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("mode"));
}

#[tokio::test]
async fn simulate_forced_method() {
    let (status, json) = get(create_router(), "/simulate?method=bernoulli&seed=9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["method"], "bernoulli_sum");
}

#[tokio::test]
async fn simulate_degenerate_reports_constant_method() {
    let (status, json) = get(create_router(), "/simulate?probability=0&method=btpe&seed=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["method"], "constant");
    assert_eq!(json["summary"]["prob_zero"], 1.0);
}

#[tokio::test]
async fn simulate_refuses_inversion_when_zero_mass_is_subnormal() {
    let uri = "/simulate?features=200&deploys=50&probability=7.18&method=inversion&seed=1";
    let (status, json) = get(create_router(), uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("method"));
}

// ── GET /presets, /preset ────────────────────────────────────────────

#[tokio::test]
async fn presets_listed() {
    let (status, json) = get(create_router(), "/presets").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json["presets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["dashboard", "script", "release"]);
}

#[tokio::test]
async fn preset_runs() {
    let (status, json) = get(create_router(), "/preset?name=release").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["trials"], 150);
    assert_eq!(json["summary"]["count"], 10_000);
}

#[tokio::test]
async fn preset_accepts_overrides() {
    let uri = "/preset?name=release&simulations=500&seed=7&threshold=8&mode=gt";
    let (status, json) = get(create_router(), uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["trials"], 150);
    assert_eq!(json["summary"]["count"], 500);
    assert_eq!(json["summary"]["threshold"], 8);
    assert_eq!(json["scenario"]["mode"], "exceeds");
    assert_eq!(json["scenario"]["parameters"]["seed"], 7);
}

#[tokio::test]
async fn preset_overrides_respect_bounds() {
    let (status, _) = get(create_router(), "/preset?name=script&features=999").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn preset_unknown_returns_404() {
    let (status, json) = get(create_router(), "/preset?name=nightly").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json.get("error").is_some());
}
