/// Structural validation of an ordered chapter sequence
use super::error::{ChapterError, Result};
use super::timestamp::format_timestamp;
use super::Chapter;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which checks run over the model's chapter list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationProfile {
    /// First chapter must sit at 0:00
    pub require_zero_start: bool,
    /// Reject gaps larger than `balance_factor` times the average chapter length
    pub enforce_balance: bool,
    /// Run title word-count and generic-term checks
    pub strict_titles: bool,
    /// Minimum distance between consecutive chapters
    pub min_spacing_seconds: u32,
    pub balance_factor: f64,
}

impl ValidationProfile {
    /// Every check enabled
    pub fn strict() -> Self {
        Self {
            require_zero_start: true,
            enforce_balance: true,
            strict_titles: true,
            min_spacing_seconds: 60,
            balance_factor: 3.0,
        }
    }

    /// Only duration bound, ordering and spacing
    pub fn lenient() -> Self {
        Self {
            require_zero_start: false,
            enforce_balance: false,
            strict_titles: false,
            ..Self::strict()
        }
    }
}

impl Default for ValidationProfile {
    fn default() -> Self {
        Self::strict()
    }
}

/// Check every timestamp against the duration, then zero start, ordering,
/// spacing and balance in one left-to-right scan.
///
/// Stops at the first violation.
pub fn validate_structure(
    chapters: &[Chapter],
    duration_seconds: u32,
    profile: &ValidationProfile,
) -> Result<()> {
    if chapters.is_empty() {
        return Err(ChapterError::EmptyChapterSet);
    }

    // Bound every chapter before comparing neighbours
    if let Some(chapter) = chapters.iter().find(|c| c.time_in_seconds > duration_seconds) {
        return Err(ChapterError::TimestampExceedsDuration {
            title: chapter.title.clone(),
            timestamp: chapter.timestamp.clone(),
            duration: format_timestamp(duration_seconds),
        });
    }

    let max_gap = profile.balance_factor * f64::from(duration_seconds) / chapters.len() as f64;
    let mut previous: Option<&Chapter> = None;

    for chapter in chapters {
        if previous.is_none() && profile.require_zero_start && chapter.time_in_seconds != 0 {
            return Err(ChapterError::FirstChapterNotAtZero {
                title: chapter.title.clone(),
                timestamp: chapter.timestamp.clone(),
            });
        }

        if let Some(prev) = previous {
            if chapter.time_in_seconds < prev.time_in_seconds {
                return Err(ChapterError::OutOfOrderTimestamp {
                    title: chapter.title.clone(),
                    timestamp: chapter.timestamp.clone(),
                    previous: prev.timestamp.clone(),
                });
            }

            let gap = chapter.time_in_seconds - prev.time_in_seconds;
            if gap < profile.min_spacing_seconds {
                return Err(ChapterError::ChapterTooShort {
                    title: chapter.title.clone(),
                    timestamp: chapter.timestamp.clone(),
                    gap_seconds: gap,
                    min_seconds: profile.min_spacing_seconds,
                });
            }

            if profile.enforce_balance && f64::from(gap) > max_gap {
                return Err(ChapterError::ChapterTooLong {
                    title: chapter.title.clone(),
                    timestamp: chapter.timestamp.clone(),
                    gap_seconds: gap,
                    max_seconds: max_gap.floor() as u32,
                });
            }
        }

        previous = Some(chapter);
    }

    debug!("Structure valid for {} chapters", chapters.len());
    Ok(())
}
