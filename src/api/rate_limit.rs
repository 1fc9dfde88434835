//! Fixed-window request limiting per client address

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

use super::models::ApiResponse;

/// Stale windows are swept once this many clients are tracked
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Counts requests per client address in fixed windows
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    // `None` keys requests that arrive without connection info
    clients: Mutex<HashMap<Option<IpAddr>, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request from `client` and report whether it is within the limit
    pub async fn check(&self, client: Option<IpAddr>) -> bool {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;

        if clients.len() >= SWEEP_THRESHOLD {
            clients.retain(|_, w| now.duration_since(w.started) < self.window);
        }

        let window = clients.entry(client).or_insert(Window { started: now, count: 0 });
        if now.duration_since(window.started) >= self.window {
            *window = Window { started: now, count: 0 };
        }

        window.count = window.count.saturating_add(1);
        window.count <= self.max_requests
    }
}

/// Reject requests beyond the per-client limit with 429
pub async fn limit_requests(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if limiter.check(client).await {
        return next.run(request).await;
    }

    warn!("🚦 Rate limit exceeded for {:?}", client);
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ApiResponse::<()>::error(
            "Too many requests, please try again later.".to_string(),
        )),
    )
        .into_response()
}
