//! Integration test: HTTP serving flow
//! Tests: health → predict (fallback and loaded model) → validation →
//! models listing → metrics listing

use axum::body::Body;
use axum::http::{Request, StatusCode};
use riskwatch::inference::{InferenceEngine, PredictionLogSink};
use riskwatch::registry::ModelRegistry;
use riskwatch::server::{create_router, AppState};
use riskwatch::store::{MemoryStore, MonitoringStore};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> (axum::Router, Arc<MemoryStore>, Arc<ModelRegistry>) {
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(ModelRegistry::new());
    let state = Arc::new(AppState {
        engine: Arc::new(InferenceEngine::new(Arc::clone(&registry))),
        sink: PredictionLogSink::spawn(Arc::clone(&store) as _),
        model_store: Arc::clone(&store) as _,
        monitoring_store: Arc::clone(&store) as _,
        registry: Arc::clone(&registry),
    });
    (create_router(state), store, registry)
}

async fn post_json(app: &axum::Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _, _) = test_app();
    let (status, json) = get_json(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_predict_fallback_low_risk() {
    let (app, _, _) = test_app();
    let (status, json) = post_json(
        &app,
        "/api/predict",
        serde_json::json!({
            "income": 200_000.0,
            "debt": 0.0,
            "credit_score": 850
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prediction_class"], 0);
    assert!(json["prediction_prob"].as_f64().unwrap() < 0.5);
    assert_eq!(json["model_version"], "fallback");
    assert!(json["request_id"].is_string());
}

#[tokio::test]
async fn test_predict_fallback_high_risk() {
    let (app, _, _) = test_app();
    let (status, json) = post_json(
        &app,
        "/api/predict",
        serde_json::json!({
            "income": 1.0,
            "debt": 0.0,
            "credit_score": 300
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prediction_class"], 1);
    assert!(json["prediction_prob"].as_f64().unwrap() > 0.5);
}

#[tokio::test]
async fn test_predict_rejects_out_of_range_score() {
    let (app, _, _) = test_app();
    let (status, json) = post_json(
        &app,
        "/api/predict",
        serde_json::json!({
            "income": 50_000.0,
            "debt": 0.0,
            "credit_score": 900
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], true);
}

#[tokio::test]
async fn test_predict_rejects_non_positive_income() {
    let (app, _, _) = test_app();
    let (status, _) = post_json(
        &app,
        "/api/predict",
        serde_json::json!({
            "income": 0.0,
            "debt": 0.0,
            "credit_score": 700
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_rejects_invalid_json() {
    let (app, _, _) = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/predict")
                .header("content-type", "application/json")
                .body(Body::from("not valid json"))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    assert!(
        status == StatusCode::UNPROCESSABLE_ENTITY || status == StatusCode::BAD_REQUEST,
        "Expected 422 or 400 for invalid JSON, got: {status}"
    );
}

#[tokio::test]
async fn test_predict_is_logged_to_store() {
    let (app, store, _) = test_app();
    let (status, _) = post_json(
        &app,
        "/api/predict",
        serde_json::json!({
            "income": 55_000.0,
            "debt": 10_000.0,
            "credit_score": 650
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The sink write is asynchronous; poll briefly
    for _ in 0..100 {
        if store.prediction_count() == 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(store.prediction_count(), 1);

    let features = store.recent_features(1).unwrap();
    assert_eq!(features[0].income, 55_000.0);
}

#[tokio::test]
async fn test_list_models_empty_catalog() {
    let (app, _, _) = test_app();
    let (status, json) = get_json(&app, "/api/models").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["serving_version"], "fallback");
    assert_eq!(json["models"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_rows() {
    let (app, store, _) = test_app();
    store
        .append_metric(riskwatch::domain::MetricRecord::new(
            "accuracy",
            0.91,
            "v1.0.0",
            chrono::Utc::now() - chrono::Duration::days(7),
            chrono::Utc::now(),
        ))
        .unwrap();

    let (status, json) = get_json(&app, "/api/metrics").await;
    assert_eq!(status, StatusCode::OK);

    let metrics = json["metrics"].as_array().unwrap();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0]["metric_name"], "accuracy");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _, _) = test_app();
    let (status, json) = get_json(&app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], true);
}
