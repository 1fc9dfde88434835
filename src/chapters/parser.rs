/// Line parser turning raw completion text into chapter candidates
use super::error::{ChapterError, Result};
use super::timestamp::{format_timestamp, parse_timestamp};
use super::{Chapter, ChapterCandidate};
use tracing::debug;

/// Separator between timestamp and title on a chapter line
pub const CHAPTER_SEPARATOR: &str = " - ";

/// Split completion text into `(timestamp, title)` candidates, preserving order.
///
/// Lines without the separator, or with nothing after it, are skipped as
/// model chatter. Fails with [`ChapterError::EmptyChapterSet`] when no
/// candidate survives.
pub fn parse_chapter_text(text: &str) -> Result<Vec<ChapterCandidate>> {
    let mut candidates = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some((raw_timestamp, title)) = line.split_once(CHAPTER_SEPARATOR) else {
            debug!("Skipping non-chapter line: {}", line);
            continue;
        };

        let title = title.trim();
        if title.is_empty() {
            debug!("Skipping chapter line without title: {}", line);
            continue;
        }

        candidates.push(ChapterCandidate {
            raw_timestamp: raw_timestamp.trim().to_string(),
            title: title.to_string(),
        });
    }

    if candidates.is_empty() {
        return Err(ChapterError::EmptyChapterSet);
    }

    debug!("Parsed {} chapter candidates", candidates.len());
    Ok(candidates)
}

/// Decode each candidate's timestamp, stopping at the first malformed one
pub fn decode_candidates(candidates: &[ChapterCandidate]) -> Result<Vec<Chapter>> {
    candidates
        .iter()
        .map(|candidate| {
            let time_in_seconds = parse_timestamp(&candidate.raw_timestamp)?;
            Ok(Chapter {
                title: candidate.title.clone(),
                timestamp: format_timestamp(time_in_seconds),
                time_in_seconds,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_lines() {
        let text = "00:00 - Introduction to Node\n05:00 - Server Setup Basics\n";
        let candidates = parse_chapter_text(text).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].raw_timestamp, "00:00");
        assert_eq!(candidates[0].title, "Introduction to Node");
        assert_eq!(candidates[1].raw_timestamp, "05:00");
    }

    #[test]
    fn test_title_keeps_inner_separator() {
        let candidates = parse_chapter_text("03:00 - Setup - Part Design").unwrap();
        assert_eq!(candidates[0].title, "Setup - Part Design");
    }

    #[test]
    fn test_noise_and_blank_lines_skipped() {
        let text = "Here are your chapters:\n\n   \r\n00:00 - Opening Remarks\nHope this helps!\n02:00 -   \n";
        let candidates = parse_chapter_text(text).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Opening Remarks");
    }

    #[test]
    fn test_empty_output_is_rejected() {
        assert_eq!(parse_chapter_text(""), Err(ChapterError::EmptyChapterSet));
        assert_eq!(
            parse_chapter_text("Sorry, I cannot help with that."),
            Err(ChapterError::EmptyChapterSet)
        );
    }

    #[test]
    fn test_decode_canonicalises_timestamp() {
        let candidates = parse_chapter_text("00:00 - Opening Remarks\n01:05 - Main Topic").unwrap();
        let chapters = decode_candidates(&candidates).unwrap();

        assert_eq!(chapters[0].timestamp, "0:00");
        assert_eq!(chapters[1].time_in_seconds, 65);
        assert_eq!(chapters[1].timestamp, "1:05");
    }

    #[test]
    fn test_decode_rejects_malformed_timestamp() {
        let candidates = parse_chapter_text("1. 00:00 - Opening Remarks").unwrap();
        assert_eq!(
            decode_candidates(&candidates),
            Err(ChapterError::MalformedTimestamp("1. 00:00".to_string()))
        );
    }
}
