/// Chapter Generator
///
/// Builds video chapter lists with a text-completion model and rejects model
/// output that is malformed, out of order, badly spaced or vaguely titled.

pub mod chapters;
pub mod config;
pub mod llm;
pub mod metadata;

#[cfg(feature = "api")]
pub mod api;

// Re-export main types for easy access
pub use crate::chapters::{
    Chapter, ChapterError, ChapterErrorKind, ChapterGenerationFailed, ChapterGenerator,
    GenerationSettings, ValidationProfile, VideoMetadata,
};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::llm::{create_provider, CompletionProvider, LLMConfig, LLMProvider, SamplingConfig};
