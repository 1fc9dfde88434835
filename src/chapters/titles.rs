/// Title quality checks for generated chapters
use super::error::{ChapterError, Result};
use super::Chapter;

pub const MIN_TITLE_WORDS: usize = 2;
pub const MAX_TITLE_WORDS: usize = 6;

/// Placeholder words that make a title say nothing about its content
pub const GENERIC_TERMS: &[&str] = &[
    "part",
    "section",
    "chapter",
    "segment",
    "portion",
    "continued",
    "misc",
    "miscellaneous",
    "other",
    "etc",
];

/// Words that turn a generic term into a specific compound ("Part Design")
pub const ALLOWED_QUALIFIERS: &[&str] = &["design", "implementation", "analysis"];

/// Validate a single title's word count and wording
pub fn validate_title(title: &str) -> Result<()> {
    let words = title.split_whitespace().count();
    if !(MIN_TITLE_WORDS..=MAX_TITLE_WORDS).contains(&words) {
        return Err(ChapterError::TitleLengthInvalid {
            title: title.to_string(),
            words,
        });
    }

    if let Some(term) = find_generic_term(title) {
        return Err(ChapterError::GenericTitleRejected {
            title: title.to_string(),
            term: term.to_string(),
        });
    }

    Ok(())
}

/// Validate every chapter title, stopping at the first failure
pub fn validate_titles(chapters: &[Chapter]) -> Result<()> {
    chapters
        .iter()
        .try_for_each(|chapter| validate_title(&chapter.title))
}

/// First generic term in the title that is not followed by an allowed qualifier
fn find_generic_term(title: &str) -> Option<&'static str> {
    let words: Vec<String> = title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    for (i, word) in words.iter().enumerate() {
        let Some(term) = GENERIC_TERMS.iter().find(|t| **t == word.as_str()) else {
            continue;
        };
        let qualified = words
            .get(i + 1)
            .is_some_and(|next| ALLOWED_QUALIFIERS.contains(&next.as_str()));
        if !qualified {
            return Some(term);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapters::ChapterErrorKind;

    #[test]
    fn test_word_count_bounds() {
        assert!(validate_title("Server Setup").is_ok());
        assert!(validate_title("One Two Three Four Five Six").is_ok());

        let err = validate_title("Intro").unwrap_err();
        assert_eq!(err.kind(), ChapterErrorKind::TitleLengthInvalid);
        assert_eq!(
            validate_title("One Two Three Four Five Six Seven").unwrap_err().kind(),
            ChapterErrorKind::TitleLengthInvalid
        );
    }

    #[test]
    fn test_generic_terms_rejected() {
        assert_eq!(
            validate_title("Next Part").unwrap_err(),
            ChapterError::GenericTitleRejected {
                title: "Next Part".to_string(),
                term: "part".to_string(),
            }
        );
        assert!(validate_title("Part 1").is_err());
        assert!(validate_title("Misc Tips, etc.").is_err());
        assert!(validate_title("Section: Wrap Up").is_err());
    }

    #[test]
    fn test_qualified_generic_term_allowed() {
        assert!(validate_title("Part Design Overview").is_ok());
        assert!(validate_title("Segment Analysis Results").is_ok());
        assert!(validate_title("Part Design and Other Ideas").is_err());
    }

    #[test]
    fn test_words_containing_terms_are_not_generic() {
        assert!(validate_title("Departure Lounge Tour").is_ok());
        assert!(validate_title("Fetching Remote Data").is_ok());
        assert!(validate_title("Mother Tongue Basics").is_ok());
    }

    #[test]
    fn test_validate_titles_stops_at_first_failure() {
        let chapters = vec![
            Chapter::new("Opening Remarks", 0),
            Chapter::new("Intro", 60),
            Chapter::new("Next Part", 120),
        ];
        assert_eq!(
            validate_titles(&chapters).unwrap_err().kind(),
            ChapterErrorKind::TitleLengthInvalid
        );
    }
}
