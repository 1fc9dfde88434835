//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Request, State},
    http::{header, HeaderName, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::{
    handlers,
    models::{ApiResponse, GenerateChaptersRequest},
    rate_limit::{limit_requests, RateLimiter},
};
use crate::chapters::ChapterGenerator;
use crate::config::ServerConfig;

const API_KEY_HEADER: &str = "x-api-key";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<ChapterGenerator>,
    pub api_key: Arc<str>,
    pub production: bool,
}

/// Build the router with auth, rate limit, body limit, CORS and tracing layers
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    // Configure CORS to allow extension/browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)]);

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/test", get(test_handler))
        .route("/api/chapters/generate", post(generate_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state);

    // Counted before the key check, so rejected keys still use up the window
    if config.rate_limit_max_requests > 0 {
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_seconds),
        ));
        router = router.layer(middleware::from_fn_with_state(limiter, limit_requests));
    }

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(DefaultBodyLimit::max(config.body_limit_bytes)),
    )
}

/// Configure and start the HTTP server
pub async fn start_http_server(generator: Arc<ChapterGenerator>, config: ServerConfig) -> Result<()> {
    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Server API key not configured"))?;

    let state = AppState {
        generator,
        api_key: Arc::from(api_key),
        production: config.production,
    };
    let app = build_router(state, &config);

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("🌐 API server listening on http://{}", address);
    info!("🔗 Generate endpoint: POST http://{}/api/chapters/generate", address);
    if config.rate_limit_max_requests > 0 {
        info!(
            "🚦 Rate limit: {} requests per {}s per client",
            config.rate_limit_max_requests, config.rate_limit_window_seconds
        );
    }

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

/// Reject requests without the configured `X-API-Key`
async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        None => unauthorized("API key is required"),
        Some(key) if key != &*state.api_key => {
            warn!("🔒 Rejected request with invalid API key");
            unauthorized("Invalid API key")
        }
        Some(_) => next.run(request).await,
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(message.to_string())),
    )
        .into_response()
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(handlers::health_check(&state.generator).await))
}

/// Liveness check kept for existing clients
async fn test_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Server is running!" }))
}

/// Chapter generation handler
async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateChaptersRequest>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(request)) => handlers::generate_chapters(&state.generator, request).await,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(handlers::ApiError::PayloadTooLarge)
        }
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            Err(handlers::ApiError::InvalidJson)
        }
    };

    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))).into_response(),
        Err(e) => {
            let (status, message) = e.status_and_message(state.production);
            (status, Json(ApiResponse::<()>::error(message))).into_response()
        }
    }
}
