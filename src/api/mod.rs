//! API module for the chapter generator
//!
//! Exposes chapter generation over HTTP for the browser extension and other clients.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::chapters::ChapterGenerator;
use crate::config::ServerConfig;

pub mod handlers;
pub mod models;
pub mod rate_limit;
pub mod server;

/// API Server for handling REST requests
pub struct ApiServer {
    generator: Arc<ChapterGenerator>,
    config: ServerConfig,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(generator: Arc<ChapterGenerator>, config: ServerConfig) -> Self {
        Self { generator, config }
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on port {}", self.config.port);

        server::start_http_server(self.generator, self.config).await
    }
}
