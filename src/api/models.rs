//! API data models

use serde::{Deserialize, Serialize};

use crate::chapters::{Chapter, VideoMetadata};

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Body of `POST /api/chapters/generate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateChaptersRequest {
    pub title: Option<String>,
    /// Seconds; fractional values from a player are floored
    pub duration: Option<f64>,
    pub transcript: Option<String>,
    pub description: Option<String>,
    pub video_id: Option<String>,
}

/// Payload of a successful generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateChaptersData {
    pub chapters: Vec<Chapter>,
    pub video_id: Option<String>,
}

/// Rejected request bodies
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("Missing required fields: title and duration are required")]
    MissingRequiredFields,

    #[error("Either transcript or description must be provided")]
    MissingContent,

    #[error("Duration must be a positive number of seconds")]
    InvalidDuration,
}

impl GenerateChaptersRequest {
    /// Check required fields and build the metadata the generator needs
    pub fn into_metadata(self) -> Result<(VideoMetadata, Option<String>), RequestError> {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or(RequestError::MissingRequiredFields)?;
        // A zero duration counts as absent, like an empty title
        let duration = self
            .duration
            .filter(|d| *d != 0.0)
            .ok_or(RequestError::MissingRequiredFields)?;

        if !duration.is_finite() || duration < 1.0 || duration > f64::from(u32::MAX) {
            return Err(RequestError::InvalidDuration);
        }

        let metadata = VideoMetadata {
            title,
            duration_seconds: duration.floor() as u32,
            transcript: self.transcript.filter(|t| !t.trim().is_empty()),
            description: self.description.filter(|d| !d.trim().is_empty()),
        };

        if !metadata.has_content() {
            return Err(RequestError::MissingContent);
        }

        Ok((metadata, self.video_id))
    }
}
