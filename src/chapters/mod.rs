/// Chapter generation and validation module
///
/// Turns the free-text chapter list returned by a text-completion model into
/// validated, ordered chapters with playback timestamps. The stages run in a
/// fixed order: line parsing, timestamp decoding, structural validation and
/// title quality validation.

pub mod error;
pub mod generator;
pub mod parser;
pub mod prompt;
pub mod timestamp;
pub mod titles;
pub mod validator;

// Re-export main types
pub use error::{ChapterError, ChapterErrorKind, ChapterGenerationFailed};
pub use generator::{validate_completion, ChapterGenerator, GenerationSettings};
pub use parser::{decode_candidates, parse_chapter_text};
pub use prompt::{build_prompt, PromptContract};
pub use timestamp::{format_timestamp, parse_timestamp};
pub use titles::{validate_title, validate_titles};
pub use validator::{validate_structure, ValidationProfile};

use serde::{Deserialize, Serialize};

/// Video details the prompt is built from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub title: String,
    /// Video length in whole seconds, at least 1
    pub duration_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VideoMetadata {
    pub fn new(title: impl Into<String>, duration_seconds: u32) -> Self {
        Self {
            title: title.into(),
            duration_seconds,
            transcript: None,
            description: None,
        }
    }

    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = Some(transcript.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// True when a transcript or description with text is present
    pub fn has_content(&self) -> bool {
        [&self.transcript, &self.description]
            .iter()
            .any(|field| field.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

/// Unvalidated `(timestamp, title)` pair taken from one line of model output
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterCandidate {
    pub raw_timestamp: String,
    pub title: String,
}

/// A validated chapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    pub title: String,
    /// Canonical `M:SS` form of `time_in_seconds`
    pub timestamp: String,
    #[serde(rename = "timeInSeconds")]
    pub time_in_seconds: u32,
}

impl Chapter {
    pub fn new(title: impl Into<String>, time_in_seconds: u32) -> Self {
        Self {
            title: title.into(),
            timestamp: format_timestamp(time_in_seconds),
            time_in_seconds,
        }
    }
}

/// Render chapters as the `M:SS Title` block used in video descriptions
pub fn render_chapter_list(chapters: &[Chapter]) -> String {
    chapters
        .iter()
        .map(|c| format!("{} {}", c.timestamp, c.title))
        .collect::<Vec<_>>()
        .join("\n")
}
