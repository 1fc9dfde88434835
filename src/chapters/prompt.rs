/// Prompt construction for chapter generation
use super::generator::GenerationSettings;
use super::timestamp::format_timestamp;
use super::titles::{MAX_TITLE_WORDS, MIN_TITLE_WORDS};
use super::validator::ValidationProfile;
use super::VideoMetadata;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates accurate and meaningful chapters for YouTube videos. Ensure all timestamps are within the video duration.";

/// The system and user prompts sent for one video
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContract {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Build the prompt pair for a video. Same inputs always give the same prompts.
pub fn build_prompt(
    metadata: &VideoMetadata,
    settings: &GenerationSettings,
    profile: &ValidationProfile,
) -> PromptContract {
    let duration = metadata.duration_seconds;
    let (min_chapters, max_chapters) = chapter_count_target(duration, settings);
    let mut lines = vec![
        "Generate chapters for a YouTube video with the following details:".to_string(),
        format!("Title: {}", metadata.title),
        format!("Duration: {} minutes and {} seconds", duration / 60, duration % 60),
    ];
    match (&metadata.transcript, &metadata.description) {
        (Some(transcript), _) if !transcript.trim().is_empty() => {
            lines.push(format!("Transcript: {}", truncate(transcript, settings.max_content_chars)));
        }
        (_, Some(description)) => {
            lines.push(format!("Description: {}", truncate(description, settings.max_content_chars)));
        }
        _ => {}
    }
    lines.extend(
        [
            "",
            "Please generate a list of chapters in the following format:",
            "00:00 - Introduction and Overview",
            "MM:SS - Chapter Title",
            "",
            "Rules:",
        ]
        .map(String::from),
    );

    let mut rules = vec![
        "Each chapter should be meaningful and descriptive".to_string(),
        "Timestamps must be in chronological order".to_string(),
    ];
    if profile.require_zero_start {
        rules.push("First chapter should start at 00:00".to_string());
    }
    rules.push(format!(
        "Last timestamp MUST NOT exceed the video duration of {}",
        format_timestamp(duration)
    ));
    rules.push(format!("Include {}-{} chapters", min_chapters, max_chapters));
    rules.push(format!(
        "Chapters must be at least {} seconds apart",
        profile.min_spacing_seconds
    ));
    if profile.enforce_balance {
        rules.push("Spread chapters across the whole video; no single chapter should cover most of it".to_string());
    }
    rules.push(format!(
        "Each chapter title should be concise ({}-{} words)",
        MIN_TITLE_WORDS, MAX_TITLE_WORDS
    ));
    if profile.strict_titles {
        rules.push(
            "Do not use generic titles such as \"Part 1\", \"Section 2\", \"Other\" or \"Misc\"; name the actual topic"
                .to_string(),
        );
    }
    rules.push("Output only the chapter lines, one per line, with no extra commentary".to_string());

    lines.extend(rules.iter().enumerate().map(|(i, rule)| format!("{}. {}", i + 1, rule)));

    PromptContract {
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt: lines.join("\n"),
    }
}

/// Inclusive chapter count range to ask for
pub fn chapter_count_target(duration_seconds: u32, settings: &GenerationSettings) -> (u32, u32) {
    if duration_seconds > settings.long_video_threshold_seconds {
        (6, 8)
    } else {
        (3, 5)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
