//! API request handlers

use axum::http::StatusCode;
use serde_json::Value;
use tracing::{error, info, warn};

use super::models::{GenerateChaptersData, GenerateChaptersRequest, RequestError};
use crate::chapters::{ChapterGenerationFailed, ChapterGenerator};

/// Failures a handler reports to the client
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Invalid JSON payload")]
    InvalidJson,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error(transparent)]
    InvalidRequest(#[from] RequestError),

    #[error(transparent)]
    Generation(#[from] ChapterGenerationFailed),
}

impl ApiError {
    /// HTTP status and client-facing message. Production mode hides model-output details.
    pub fn status_and_message(&self, production: bool) -> (StatusCode, String) {
        match self {
            ApiError::InvalidJson | ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            ApiError::Generation(failure) if failure.cause.is_provider_failure() => (
                StatusCode::SERVICE_UNAVAILABLE,
                "AI service temporarily unavailable".to_string(),
            ),
            ApiError::Generation(failure) => {
                let message = if production {
                    "Internal server error".to_string()
                } else {
                    failure.to_string()
                };
                (StatusCode::BAD_GATEWAY, message)
            }
        }
    }
}

/// Handle health check requests, reporting whether the completion provider answers
pub async fn health_check(generator: &ChapterGenerator) -> Value {
    let available = generator.provider_available().await;
    if !available {
        warn!("⚠️ Completion provider {:?} is not reachable", generator.provider_type());
    }

    serde_json::json!({
        "status": if available { "healthy" } else { "degraded" },
        "service": "chaptergen",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": {
            "type": generator.provider_type(),
            "available": available
        },
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
}

/// Handle chapter generation requests
pub async fn generate_chapters(
    generator: &ChapterGenerator,
    request: GenerateChaptersRequest,
) -> Result<GenerateChaptersData, ApiError> {
    let (metadata, video_id) = request.into_metadata()?;

    info!(
        "📥 Chapter request for '{}' (video id: {})",
        metadata.title,
        video_id.as_deref().unwrap_or("none")
    );

    match generator.generate(&metadata).await {
        Ok(chapters) => Ok(GenerateChaptersData { chapters, video_id }),
        Err(failure) => {
            error!("Chapter generation failed: {}", failure);
            Err(ApiError::Generation(failure))
        }
    }
}
