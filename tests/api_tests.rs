#![cfg(feature = "api")]

use anyhow::anyhow;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chaptergen::api::server::{build_router, AppState};
use chaptergen::config::ServerConfig;
use chaptergen::llm::{CompletionRequest, CompletionResponse};
use chaptergen::{ChapterGenerator, CompletionProvider, LLMProvider};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const API_KEY: &str = "test-secret";

struct StubProvider {
    reply: Option<&'static str>,
}

#[async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(&self, _request: CompletionRequest) -> anyhow::Result<CompletionResponse> {
        match self.reply {
            Some(text) => Ok(CompletionResponse {
                content: text.to_string(),
                tokens_used: Some(42),
            }),
            None => Err(anyhow!("upstream returned 500")),
        }
    }

    async fn is_available(&self) -> bool {
        self.reply.is_some()
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::OpenAI
    }
}

fn app_with(reply: Option<&'static str>, production: bool, config: &ServerConfig) -> Router {
    let generator = ChapterGenerator::new(Arc::new(StubProvider { reply }));
    let state = AppState {
        generator: Arc::new(generator),
        api_key: Arc::from(API_KEY),
        production,
    };
    build_router(state, config)
}

fn app(reply: Option<&'static str>, production: bool) -> Router {
    app_with(reply, production, &ServerConfig::default())
}

fn generate_request(key: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/chapters/generate")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn valid_body() -> String {
    json!({
        "title": "Learn Node.js in 1 Hour",
        "duration": 3600.4,
        "description": "Node.js tutorial covering servers and databases",
        "videoId": "abc123"
    })
    .to_string()
}

const GOOD_COMPLETION: &str =
    "00:00 - Introduction to Node\n05:00 - Server Setup Basics\n15:00 - Database Integration Steps";

#[tokio::test]
async fn test_generate_returns_chapters() {
    let response = app(Some(GOOD_COMPLETION), false)
        .oneshot(generate_request(Some(API_KEY), valid_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["videoId"], "abc123");
    assert_eq!(body["data"]["chapters"][1]["timeInSeconds"], 300);
    assert_eq!(body["data"]["chapters"][1]["timestamp"], "5:00");
}

#[tokio::test]
async fn test_missing_api_key_is_rejected() {
    let response = app(Some(GOOD_COMPLETION), false)
        .oneshot(generate_request(None, valid_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["error"], "API key is required");
}

#[tokio::test]
async fn test_wrong_api_key_is_rejected() {
    let response = app(Some(GOOD_COMPLETION), false)
        .oneshot(generate_request(Some("nope"), valid_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["error"], "Invalid API key");
}

#[tokio::test]
async fn test_missing_content_is_bad_request() {
    let body = json!({ "title": "No Content", "duration": 600 }).to_string();
    let response = app(Some(GOOD_COMPLETION), false)
        .oneshot(generate_request(Some(API_KEY), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await["error"],
        "Either transcript or description must be provided"
    );
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let response = app(Some(GOOD_COMPLETION), false)
        .oneshot(generate_request(Some(API_KEY), "{not json".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["success"], false);
}

#[tokio::test]
async fn test_provider_failure_is_service_unavailable() {
    let response = app(None, false)
        .oneshot(generate_request(Some(API_KEY), valid_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(read_json(response).await["error"], "AI service temporarily unavailable");
}

#[tokio::test]
async fn test_invalid_output_hides_detail_in_production() {
    let bad = Some("00:00 - Intro\n00:30 - Next Part");

    let response = app(bad, false)
        .oneshot(generate_request(Some(API_KEY), valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let detail = read_json(response).await["error"].as_str().unwrap().to_string();
    assert!(detail.contains("Next Part"));

    let response = app(bad, true)
        .oneshot(generate_request(Some(API_KEY), valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(read_json(response).await["error"], "Internal server error");
}

#[tokio::test]
async fn test_health_requires_api_key() {
    let request = Request::builder()
        .uri("/health")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app(None, false).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health = read_json(response).await;
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["provider"]["available"], false);

    let anonymous = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app(None, false).oneshot(anonymous).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_zero_duration_is_a_missing_field() {
    let body = json!({ "title": "Zero", "duration": 0, "description": "Something" }).to_string();
    let response = app(Some(GOOD_COMPLETION), false)
        .oneshot(generate_request(Some(API_KEY), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await["error"],
        "Missing required fields: title and duration are required"
    );
}

#[tokio::test]
async fn test_requests_over_the_limit_are_rejected() {
    let config = ServerConfig {
        rate_limit_max_requests: 2,
        ..ServerConfig::default()
    };
    let app = app_with(Some(GOOD_COMPLETION), false, &config);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(generate_request(Some(API_KEY), valid_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Unauthenticated requests are counted and rejected by the limiter first
    let response = app
        .clone()
        .oneshot(generate_request(None, valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        read_json(response).await["error"],
        "Too many requests, please try again later."
    );
}

#[tokio::test]
async fn test_rate_limit_can_be_disabled() {
    let config = ServerConfig {
        rate_limit_max_requests: 0,
        ..ServerConfig::default()
    };
    let app = app_with(None, false, &config);

    for _ in 0..5 {
        let request = Request::builder().uri("/test").header("x-api-key", API_KEY).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
