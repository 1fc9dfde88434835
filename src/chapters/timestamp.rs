//! `MM:SS` timestamp conversion

use super::error::{ChapterError, Result};

/// Parse a `minutes:seconds` timestamp into whole seconds
pub fn parse_timestamp(text: &str) -> Result<u32> {
    let malformed = || ChapterError::MalformedTimestamp(text.to_string());

    let (minutes, seconds) = text.split_once(':').ok_or_else(malformed)?;
    let minutes = parse_field(minutes).ok_or_else(malformed)?;
    let seconds = parse_field(seconds).ok_or_else(malformed)?;

    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(malformed)
}

/// Format seconds as `M:SS` with unpadded minutes
pub fn format_timestamp(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn parse_field(field: &str) -> Option<u32> {
    // u32::from_str accepts a leading '+', so check digits first
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
