/// Chapter generation orchestrator: prompt, provider call, then the validation pipeline
use super::error::{ChapterError, ChapterGenerationFailed};
use super::parser::{decode_candidates, parse_chapter_text};
use super::prompt::{build_prompt, PromptContract};
use super::titles::validate_titles;
use super::validator::{validate_structure, ValidationProfile};
use super::{Chapter, VideoMetadata};
use crate::llm::{CompletionProvider, CompletionRequest, LLMProvider, SamplingConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Tunables for prompt construction and the provider call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationSettings {
    /// Videos longer than this get the larger chapter-count target
    pub long_video_threshold_seconds: u32,
    /// Abort the completion call after this many seconds
    pub request_timeout_seconds: u64,
    /// Transcript/description text beyond this is cut before prompting
    pub max_content_chars: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            long_video_threshold_seconds: 600,
            request_timeout_seconds: 10,
            max_content_chars: 12_000,
        }
    }
}

/// Parse, decode, then run structural and (when enabled) title checks over completion text
pub fn validate_completion(
    text: &str,
    duration_seconds: u32,
    profile: &ValidationProfile,
) -> Result<Vec<Chapter>, ChapterError> {
    let candidates = parse_chapter_text(text)?;
    let chapters = decode_candidates(&candidates)?;
    validate_structure(&chapters, duration_seconds, profile)?;
    if profile.strict_titles {
        validate_titles(&chapters)?;
    }
    Ok(chapters)
}

/// Turns video metadata into a validated chapter list through an injected provider
#[derive(Clone)]
pub struct ChapterGenerator {
    provider: Arc<dyn CompletionProvider>,
    settings: GenerationSettings,
    profile: ValidationProfile,
    sampling: SamplingConfig,
}

impl ChapterGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            settings: GenerationSettings::default(),
            profile: ValidationProfile::default(),
            sampling: SamplingConfig::default(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_profile(mut self, profile: ValidationProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn provider_type(&self) -> LLMProvider {
        self.provider.provider_type()
    }

    /// Whether the completion provider answers a lightweight reachability request
    pub async fn provider_available(&self) -> bool {
        self.provider.is_available().await
    }

    /// Prompt pair this generator would send for `metadata`
    pub fn build_prompt(&self, metadata: &VideoMetadata) -> PromptContract {
        build_prompt(metadata, &self.settings, &self.profile)
    }

    /// Generate chapters for one video. No retries and no partial results.
    pub async fn generate(&self, metadata: &VideoMetadata) -> Result<Vec<Chapter>, ChapterGenerationFailed> {
        info!(
            "🎬 Generating chapters for '{}' ({}s)",
            metadata.title, metadata.duration_seconds
        );

        let completion = self.request_completion(metadata).await.map_err(|e| {
            warn!("❌ Completion request failed: {}", e);
            ChapterGenerationFailed::from(e)
        })?;

        let chapters = self
            .process_completion(&completion, metadata.duration_seconds)
            .map_err(|e| {
                warn!("❌ Rejected model output: {}", e);
                debug!("Rejected completion text:\n{}", completion);
                ChapterGenerationFailed::from(e)
            })?;

        info!("✅ Generated {} chapters", chapters.len());
        Ok(chapters)
    }

    /// Run the validation pipeline over raw completion text with this generator's profile
    pub fn process_completion(&self, text: &str, duration_seconds: u32) -> Result<Vec<Chapter>, ChapterError> {
        validate_completion(text, duration_seconds, &self.profile)
    }

    async fn request_completion(&self, metadata: &VideoMetadata) -> Result<String, ChapterError> {
        let prompt = self.build_prompt(metadata);
        let request = CompletionRequest {
            system_prompt: prompt.system_prompt,
            user_prompt: prompt.user_prompt,
            sampling: self.sampling.clone(),
        };

        let timeout = Duration::from_secs(self.settings.request_timeout_seconds);
        let started = Instant::now();

        let response = match tokio::time::timeout(timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(ChapterError::ProviderUnavailable(e.to_string())),
            Err(_) => return Err(ChapterError::RequestTimedOut(self.settings.request_timeout_seconds)),
        };

        debug!(
            "Completion from {:?} in {:.2}s (tokens: {:?})",
            self.provider.provider_type(),
            started.elapsed().as_secs_f64(),
            response.tokens_used
        );

        Ok(response.content)
    }
}
