/// Video metadata extraction from YouTube watch pages
use crate::chapters::VideoMetadata;
use anyhow::{anyhow, Result};
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const WATCH_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com"];

/// Video id from a `youtube.com/watch?v=<id>` URL, if it is one
pub fn parse_watch_url(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    let host = url.host_str()?;

    if !WATCH_HOSTS.contains(&host) || url.path() != "/watch" {
        return None;
    }

    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}

/// Parse an ISO-8601 duration such as `PT1H2M3S` into seconds
pub fn parse_iso_duration(value: &str) -> Option<u32> {
    static ISO_DURATION_RE: OnceLock<Regex> = OnceLock::new();
    let re = ISO_DURATION_RE.get_or_init(|| {
        Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").expect("duration regex should compile")
    });
    let caps = re.captures(value.trim())?;

    let field = |i: usize| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let seconds = field(1)?
        .checked_mul(3600)?
        .checked_add(field(2)?.checked_mul(60)?)?
        .checked_add(field(3)?)?;
    Some(seconds)
}

/// Extract title, duration, description and transcript from watch page HTML
pub fn extract_video_metadata(html: &str) -> Result<VideoMetadata> {
    let document = Html::parse_document(html);

    let title = select_text(&document, "title")
        .map(|t| t.trim_end_matches(" - YouTube").trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| select_attr(&document, "meta[name='title']", "content"))
        .ok_or_else(|| anyhow!("Video title not found"))?;

    let duration_seconds = select_attr(&document, "meta[itemprop='duration']", "content")
        .and_then(|d| parse_iso_duration(&d))
        .filter(|d| *d > 0)
        .ok_or_else(|| anyhow!("Video duration not found"))?;

    let description = select_text(&document, "#description-inner")
        .or_else(|| select_attr(&document, "meta[name='description']", "content"));
    let transcript = select_text(&document, "#transcript-scrollbox");

    let metadata = VideoMetadata {
        title,
        duration_seconds,
        transcript,
        description,
    };

    if !metadata.has_content() {
        return Err(anyhow!("Neither transcript nor description found on page"));
    }

    debug!(
        "Extracted metadata: '{}' ({}s, transcript: {})",
        metadata.title,
        metadata.duration_seconds,
        metadata.transcript.is_some()
    );
    Ok(metadata)
}

/// Download a watch page and extract its metadata
pub async fn fetch_video_metadata(url: &str, timeout_seconds: u64) -> Result<VideoMetadata> {
    let video_id = parse_watch_url(url).ok_or_else(|| anyhow!("Not a YouTube watch URL: {}", url))?;

    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
        .build()?;

    info!("📄 Fetching watch page for video {}", video_id);
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(anyhow!("HTTP error {}: {}", response.status(), url));
    }

    let html = response.text().await?;
    debug!("📄 Downloaded {} characters of HTML content", html.len());

    extract_video_metadata(&html)
}

fn select_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    let element = document.select(&selector).next()?;
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");

    (!text.is_empty()).then_some(text)
}

fn select_attr(document: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .next()?
        .value()
        .attr(attr)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
