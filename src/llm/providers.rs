use super::{ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse, LLMConfig, LLMProvider, SamplingConfig};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const LMSTUDIO_CHAT_URL: &str = "http://localhost:1234/v1/chat/completions";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

fn build_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .user_agent(concat!("chaptergen/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Request body shared by OpenAI and OpenAI-compatible servers
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
}

impl ChatCompletionRequest {
    fn new(model: &str, request: CompletionRequest) -> Self {
        let SamplingConfig {
            temperature,
            max_tokens,
            presence_penalty,
            frequency_penalty,
        } = request.sampling.clone();

        Self {
            model: model.to_string(),
            messages: request.messages(),
            max_tokens,
            temperature,
            presence_penalty,
            frequency_penalty,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
    usage: Option<ChatCompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionUsage {
    total_tokens: u32,
}

impl ChatCompletionResponse {
    fn into_completion(self, provider: &str) -> Result<CompletionResponse> {
        let content = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No response from {}", provider))?
            .message
            .content;

        Ok(CompletionResponse {
            content,
            tokens_used: self.usage.map(|u| u.total_tokens),
        })
    }
}

async fn read_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    anyhow!("{} API error {}: {}", provider, status, text)
}

/// LMStudio provider implementation
pub struct LMStudioProvider {
    config: LLMConfig,
    client: reqwest::Client,
}

impl LMStudioProvider {
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = build_client()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> &str {
        self.config.endpoint.as_deref().unwrap_or(LMSTUDIO_CHAT_URL)
    }
}

#[async_trait]
impl CompletionProvider for LMStudioProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let endpoint = self.endpoint();
        let body = ChatCompletionRequest::new(&self.config.model, request);

        debug!("Sending request to LMStudio at {}", endpoint);

        let response = self.client.post(endpoint).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(read_error("LMStudio", response).await);
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed.into_completion("LMStudio")
    }

    async fn is_available(&self) -> bool {
        let health_endpoint = self.endpoint().replace("/v1/chat/completions", "/v1/models");

        match self.client.get(&health_endpoint).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::LMStudio
    }
}

/// Gemini provider implementation
pub struct GeminiProvider {
    config: LLMConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
    #[serde(rename = "presencePenalty", skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    #[serde(rename = "frequencyPenalty", skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiUsage {
    #[serde(rename = "totalTokenCount")]
    total_token_count: u32,
}

impl GeminiProvider {
    pub fn new(config: LLMConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(anyhow!("Gemini API key required"));
        }

        let client = build_client()?;
        Ok(Self { config, client })
    }

    fn base_url(&self) -> &str {
        self.config.endpoint.as_deref().unwrap_or(GEMINI_BASE_URL)
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow!("Gemini API key not configured"))?;

        let sampling = &request.sampling;
        let body = GeminiRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart { text: request.system_prompt.clone() }],
            },
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: request.user_prompt.clone() }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: sampling.max_tokens,
                temperature: sampling.temperature,
                presence_penalty: sampling.presence_penalty,
                frequency_penalty: sampling.frequency_penalty,
            },
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url(),
            self.config.model,
            api_key
        );

        debug!("Sending request to Gemini API");

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(read_error("Gemini", response).await);
        }

        let gemini_response: GeminiResponse = response.json().await?;

        let tokens_used = gemini_response
            .usage_metadata
            .as_ref()
            .map(|u| u.total_token_count);

        let content = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| anyhow!("No response from Gemini"))?;

        Ok(CompletionResponse {
            content,
            tokens_used,
        })
    }

    async fn is_available(&self) -> bool {
        let Some(api_key) = &self.config.api_key else {
            return false;
        };
        let url = format!("{}/models?key={}", self.base_url(), api_key);

        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::Gemini
    }
}

/// OpenAI provider implementation
pub struct OpenAIProvider {
    config: LLMConfig,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(config: LLMConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(anyhow!("OpenAI API key required"));
        }

        let client = build_client()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> &str {
        self.config.endpoint.as_deref().unwrap_or(OPENAI_CHAT_URL)
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow!("OpenAI API key not configured"))?;

        let body = ChatCompletionRequest::new(&self.config.model, request);

        debug!("Sending request to OpenAI API");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(read_error("OpenAI", response).await);
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed.into_completion("OpenAI")
    }

    async fn is_available(&self) -> bool {
        let Some(api_key) = &self.config.api_key else {
            return false;
        };
        let url = self.endpoint().replace("/chat/completions", "/models");

        match self.client.get(&url).bearer_auth(api_key).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::OpenAI
    }
}
