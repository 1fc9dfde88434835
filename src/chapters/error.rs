//! Error taxonomy for chapter generation

use serde::Serialize;

/// Result type for the chapter pipeline stages
pub type Result<T> = std::result::Result<T, ChapterError>;

/// A classified failure from one stage of the chapter pipeline
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ChapterError {
    #[error("Malformed timestamp '{0}': expected MM:SS")]
    MalformedTimestamp(String),

    #[error("No chapters found in the model output")]
    EmptyChapterSet,

    #[error("Chapter '{title}' at {timestamp} does not start at 0:00")]
    FirstChapterNotAtZero { title: String, timestamp: String },

    #[error("Chapter timestamp {timestamp} exceeds video duration of {duration}")]
    TimestampExceedsDuration {
        title: String,
        timestamp: String,
        duration: String,
    },

    #[error("Chapter '{title}' at {timestamp} comes before the previous chapter at {previous}")]
    OutOfOrderTimestamp {
        title: String,
        timestamp: String,
        previous: String,
    },

    #[error("Chapter '{title}' at {timestamp} is only {gap_seconds}s after the previous chapter (minimum {min_seconds}s)")]
    ChapterTooShort {
        title: String,
        timestamp: String,
        gap_seconds: u32,
        min_seconds: u32,
    },

    #[error("Chapter '{title}' at {timestamp} follows a {gap_seconds}s gap, more than the {max_seconds}s allowed")]
    ChapterTooLong {
        title: String,
        timestamp: String,
        gap_seconds: u32,
        max_seconds: u32,
    },

    #[error("Chapter title '{title}' has {words} words (expected 2-6)")]
    TitleLengthInvalid { title: String, words: usize },

    #[error("Chapter title '{title}' uses the generic term '{term}'")]
    GenericTitleRejected { title: String, term: String },

    #[error("Completion request timed out after {0}s")]
    RequestTimedOut(u64),

    #[error("Completion provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Fieldless classification of [`ChapterError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChapterErrorKind {
    MalformedTimestamp,
    EmptyChapterSet,
    FirstChapterNotAtZero,
    TimestampExceedsDuration,
    OutOfOrderTimestamp,
    ChapterTooShort,
    ChapterTooLong,
    TitleLengthInvalid,
    GenericTitleRejected,
    RequestTimedOut,
    ProviderUnavailable,
}

impl ChapterError {
    pub fn kind(&self) -> ChapterErrorKind {
        match self {
            ChapterError::MalformedTimestamp(_) => ChapterErrorKind::MalformedTimestamp,
            ChapterError::EmptyChapterSet => ChapterErrorKind::EmptyChapterSet,
            ChapterError::FirstChapterNotAtZero { .. } => ChapterErrorKind::FirstChapterNotAtZero,
            ChapterError::TimestampExceedsDuration { .. } => ChapterErrorKind::TimestampExceedsDuration,
            ChapterError::OutOfOrderTimestamp { .. } => ChapterErrorKind::OutOfOrderTimestamp,
            ChapterError::ChapterTooShort { .. } => ChapterErrorKind::ChapterTooShort,
            ChapterError::ChapterTooLong { .. } => ChapterErrorKind::ChapterTooLong,
            ChapterError::TitleLengthInvalid { .. } => ChapterErrorKind::TitleLengthInvalid,
            ChapterError::GenericTitleRejected { .. } => ChapterErrorKind::GenericTitleRejected,
            ChapterError::RequestTimedOut(_) => ChapterErrorKind::RequestTimedOut,
            ChapterError::ProviderUnavailable(_) => ChapterErrorKind::ProviderUnavailable,
        }
    }

    /// True when the failure came from the completion provider rather than its output
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            ChapterError::RequestTimedOut(_) | ChapterError::ProviderUnavailable(_)
        )
    }
}

/// Terminal failure of one generation request, wrapping the first classified cause
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Chapter generation failed: {cause}")]
pub struct ChapterGenerationFailed {
    #[source]
    pub cause: ChapterError,
}

impl ChapterGenerationFailed {
    pub fn kind(&self) -> ChapterErrorKind {
        self.cause.kind()
    }
}

impl From<ChapterError> for ChapterGenerationFailed {
    fn from(cause: ChapterError) -> Self {
        Self { cause }
    }
}
