//! Integration tests for the HTTP score source against an in-process
//! generator

mod common;

use axum::{http::StatusCode, routing::post, Json, Router};
use common::viewer;
use invoker_cache::{
    CacheError, CascadeConfig, CascadeOrchestrator, HttpScoreSource, ScoreSource,
    SourceDescriptor,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Echoes the requested model back with a score derived from the viewer id
async fn generate(Json(body): Json<Value>) -> Json<Value> {
    let model = body["model_name"].as_str().unwrap_or_default().to_string();
    let viewer_len = body["viewer_id"].as_str().unwrap_or_default().len() as i64;
    Json(json!({ "reason": model, "result": viewer_len }))
}

async fn always_error() -> StatusCode {
    StatusCode::BAD_GATEWAY
}

async fn wrong_shape() -> Json<Value> {
    Json(json!({ "reason": "ModelA" }))
}

async fn wrong_model() -> Json<Value> {
    Json(json!({ "reason": "SomeoneElse", "result": 5 }))
}

async fn out_of_range(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "reason": body["model_name"], "result": 1000 }))
}

/// Start the fake generator on an ephemeral port and return its base URL
async fn start_generator() -> String {
    let app = Router::new()
        .route("/generate", post(generate))
        .route("/error", post(always_error))
        .route("/shape", post(wrong_shape))
        .route("/model", post(wrong_model))
        .route("/range", post(out_of_range));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn source(name: &str, url: String) -> HttpScoreSource {
    HttpScoreSource::new(SourceDescriptor::new(name, url), reqwest::Client::new())
}

#[tokio::test]
async fn test_successful_call() {
    let base = start_generator().await;
    let source = source("ModelA", format!("{}/generate", base));

    let score = source.call(&viewer("12345")).await.unwrap();

    assert_eq!(score.source_name(), "ModelA");
    assert_eq!(score.value(), 5);
}

#[tokio::test]
async fn test_error_status_is_failure() {
    let base = start_generator().await;
    let source = source("ModelA", format!("{}/error", base));

    let err = source.call(&viewer("123")).await.unwrap_err();
    assert!(matches!(err, CacheError::Http(_)));
}

#[tokio::test]
async fn test_malformed_payload_is_failure() {
    let base = start_generator().await;

    let shape = source("ModelA", format!("{}/shape", base));
    assert!(matches!(
        shape.call(&viewer("123")).await.unwrap_err(),
        CacheError::SourceFailed { .. }
    ));

    let model = source("ModelA", format!("{}/model", base));
    assert!(matches!(
        model.call(&viewer("123")).await.unwrap_err(),
        CacheError::SourceFailed { .. }
    ));

    let range = source("ModelA", format!("{}/range", base));
    assert!(matches!(
        range.call(&viewer("123")).await.unwrap_err(),
        CacheError::InvalidScore(_)
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_failure() {
    let source = source("ModelA", "http://127.0.0.1:1/generate".to_string());
    assert!(source.call(&viewer("123")).await.is_err());
}

#[tokio::test]
async fn test_cascade_over_http_sources() {
    let base = start_generator().await;
    let client = reqwest::Client::new();

    let mut sources: Vec<Arc<dyn ScoreSource>> = ["ModelA", "ModelB", "ModelC"]
        .iter()
        .map(|name| {
            Arc::new(HttpScoreSource::new(
                SourceDescriptor::new(*name, format!("{}/generate", base)),
                client.clone(),
            )) as Arc<dyn ScoreSource>
        })
        .collect();
    sources.push(Arc::new(HttpScoreSource::new(
        SourceDescriptor::new("ModelD", format!("{}/error", base)),
        client.clone(),
    )));

    let cascade = CascadeOrchestrator::new(
        sources,
        CascadeConfig {
            call_timeout: Duration::from_secs(5),
            deadline: None,
        },
    )
    .unwrap();

    let results = cascade.run(&viewer("1234567")).await.unwrap();

    assert_eq!(results.len(), 3);
    assert!(!results.contains_source("ModelD"));
    assert!(results.iter().all(|r| r.value() == 7));
}
