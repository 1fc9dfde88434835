use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::chapters::{GenerationSettings, ValidationProfile};
use crate::llm::{LLMConfig, LLMProvider};

/// Configuration for the chapter generator
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP boundary settings
    pub server: ServerConfig,

    /// Completion provider settings
    pub llm: LLMConfig,

    /// Prompt and provider-call tunables
    pub generation: GenerationSettings,

    /// Which checks run over generated chapters
    pub validation: ValidationProfile,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Secret expected in the `X-API-Key` header
    pub api_key: Option<String>,

    /// Hide failure details from clients
    pub production: bool,

    /// Maximum request body size in bytes
    pub body_limit_bytes: usize,

    /// Requests allowed per client in each window; 0 disables limiting
    pub rate_limit_max_requests: u32,

    /// Length of the rate-limit window in seconds
    pub rate_limit_window_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            api_key: None,
            production: false,
            body_limit_bytes: 1024 * 1024, // 1MB
            rate_limit_max_requests: 100,
            rate_limit_window_seconds: 15 * 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level for the chaptergen target
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Filter directive for tracing-subscriber
    pub fn filter_directive(&self) -> String {
        format!("chaptergen={},warn", self.level)
    }
}

impl Config {
    /// Load configuration from the first config file found, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_paths = [
            "chaptergen.toml",
            "config/chaptergen.toml",
            "/etc/chaptergen/config.toml",
        ];

        for path in &config_paths {
            if Path::new(path).exists() {
                match Self::load_from(path) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to load config file {}: {}", path, e),
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from one file, then apply environment overrides
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read {}: {}", path.display(), e))?;
        let mut config: Config = toml::from_str(&config_str)?;
        config.apply_env_overrides();

        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override settings from environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = var("OPENAI_API_KEY") {
            let key = strip_quotes(&key);
            if !key.is_empty() {
                self.llm.api_key = Some(key);
            }
        }

        if let Some(key) = var("CHAPTERGEN_API_KEY") {
            self.server.api_key = Some(strip_quotes(&key));
        }

        if let Some(port) = var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
            }
        }

        if let Some(model) = var("CHAPTERGEN_MODEL") {
            self.llm.model = model;
        }

        if let Some(env) = var("CHAPTERGEN_ENV") {
            self.server.production = env.eq_ignore_ascii_case("production");
        }

        if let Some(level) = var("CHAPTERGEN_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration for chapter generation
    pub fn validate(&self) -> Result<()> {
        if self.generation.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }

        if self.validation.min_spacing_seconds == 0 {
            return Err(anyhow!("min_spacing_seconds must be greater than 0"));
        }

        if !self.validation.balance_factor.is_finite() || self.validation.balance_factor <= 0.0 {
            return Err(anyhow!("balance_factor must be a finite number greater than 0"));
        }

        if self.llm.provider.requires_api_key() && self.llm.api_key.is_none() {
            return Err(anyhow!("API key required for {:?} provider", self.llm.provider));
        }

        Ok(())
    }

    /// Validate configuration for running the HTTP server
    pub fn validate_for_server(&self) -> Result<()> {
        self.validate()?;

        if self.server.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(anyhow!("server.api_key (or CHAPTERGEN_API_KEY) must be set to run the server"));
        }

        if self.server.rate_limit_max_requests > 0 && self.server.rate_limit_window_seconds == 0 {
            return Err(anyhow!("rate_limit_window_seconds must be greater than 0 when rate limiting is on"));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Chapter Generator Configuration:\n\
            - Provider: {:?} ({})\n\
            - Temperature: {} / Max Tokens: {}\n\
            - Request Timeout: {}s\n\
            - Strict Titles: {}\n\
            - Balance Check: {}\n\
            - Zero Start Required: {}",
            self.llm.provider,
            self.llm.model,
            self.llm.sampling.temperature,
            self.llm.sampling.max_tokens,
            self.generation.request_timeout_seconds,
            self.validation.strict_titles,
            self.validation.enforce_balance,
            self.validation.require_zero_start
        )
    }
}

fn strip_quotes(value: &str) -> String {
    value.trim().replace(['"', '\''], "")
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_provider(mut self, provider: LLMProvider) -> Self {
        self.config.llm.provider = provider;
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.llm.api_key = Some(api_key);
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.config.llm.model = model;
        self
    }

    pub fn with_server_api_key(mut self, api_key: String) -> Self {
        self.config.server.api_key = Some(api_key);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_profile(mut self, profile: ValidationProfile) -> Self {
        self.config.validation = profile;
        self
    }

    pub fn with_request_timeout(mut self, seconds: u64) -> Self {
        self.config.generation.request_timeout_seconds = seconds;
        self
    }

    pub fn production(mut self, production: bool) -> Self {
        self.config.server.production = production;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.generation.request_timeout_seconds, 10);
        assert!(config.validation.strict_titles);
        assert_eq!(config.logging.filter_directive(), "chaptergen=info,warn");
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_api_key("sk-test".to_string())
            .with_port(8080)
            .with_profile(ValidationProfile::lenient())
            .build();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert!(!config.validation.strict_titles);
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_err());

        let config = ConfigBuilder::new().with_api_key("sk-test".to_string()).build();
        assert!(config.validate().is_ok());
        assert!(config.validate_for_server().is_err());

        let server = ConfigBuilder::new()
            .with_api_key("sk-test".to_string())
            .with_server_api_key("secret".to_string())
            .build();
        assert!(server.validate_for_server().is_ok());

        let zero_timeout = ConfigBuilder::new()
            .with_api_key("sk-test".to_string())
            .with_request_timeout(0)
            .build();
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_rate_limit_settings() {
        let config = Config::default();
        assert_eq!(config.server.rate_limit_max_requests, 100);
        assert_eq!(config.server.rate_limit_window_seconds, 900);

        let mut server = ConfigBuilder::new()
            .with_api_key("sk-test".to_string())
            .with_server_api_key("secret".to_string())
            .build();
        server.server.rate_limit_window_seconds = 0;
        assert!(server.validate_for_server().is_err());

        server.server.rate_limit_max_requests = 0;
        assert!(server.validate_for_server().is_ok());
    }

    #[test]
    fn test_balance_factor_must_be_finite_and_positive() {
        let base = ConfigBuilder::new().with_api_key("sk-test".to_string()).build();

        for factor in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            let mut config = base.clone();
            config.validation.balance_factor = factor;
            assert!(config.validate().is_err(), "balance_factor {} accepted", factor);
        }

        let mut config = base;
        config.validation.balance_factor = 2.5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("OPENAI_API_KEY", "\"sk-quoted\""),
            ("CHAPTERGEN_API_KEY", "test-key-123"),
            ("PORT", "4000"),
            ("CHAPTERGEN_ENV", "Production"),
        ]));

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-quoted"));
        assert_eq!(config.server.api_key.as_deref(), Some("test-key-123"));
        assert_eq!(config.server.port, 4000);
        assert!(config.server.production);
    }

    #[test]
    fn test_invalid_port_ignored() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("PORT", "not-a-port")]));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [llm]
            model = "gpt-4o-mini"

            [llm.sampling]
            temperature = 0.2

            [validation]
            enforce_balance = false
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.sampling.temperature, 0.2);
        assert_eq!(config.llm.sampling.max_tokens, 500);
        assert!(!config.validation.enforce_balance);
        assert!(config.validation.strict_titles);
    }
}
