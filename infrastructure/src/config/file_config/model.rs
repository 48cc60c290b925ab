//! Model configuration from TOML (`[model]` section)

use super::ConfigValidationError;
use crate::llm::{DEFAULT_MODEL, DEFAULT_SEED, DEFAULT_TEMPERATURE, OpenAiGatewayConfig, ProviderPreset};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw model configuration from TOML
///
/// # Example
///
/// ```toml
/// [model]
/// provider = "groq"                   # "groq", "ollama" or "openai"
/// name = "llama-3.3-70b-versatile"
/// temperature = 0.4
/// seed = 42
/// # base_url = "http://localhost:11434/v1"
/// # api_key_env = "GROQ_API_KEY"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    pub provider: String,
    pub name: String,
    pub temperature: f32,
    pub seed: Option<u64>,
    /// Overrides the provider's endpoint
    pub base_url: Option<String>,
    /// Overrides the environment variable the API key is read from
    pub api_key_env: Option<String>,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            provider: ProviderPreset::Groq.as_str().to_string(),
            name: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            seed: Some(DEFAULT_SEED),
            base_url: None,
            api_key_env: None,
        }
    }
}

impl FileModelConfig {
    pub fn preset(&self) -> Result<ProviderPreset, ConfigValidationError> {
        self.provider
            .parse()
            .map_err(|_| ConfigValidationError::UnknownProvider(self.provider.clone()))
    }

    /// Environment variable the API key is read from, if any.
    pub fn api_key_var(&self) -> Result<Option<String>, ConfigValidationError> {
        Ok(match &self.api_key_env {
            Some(var) => Some(var.clone()),
            None => self.preset()?.api_key_env().map(str::to_string),
        })
    }

    /// Resolve into gateway settings, reading the API key through `lookup`.
    pub fn gateway_config(
        &self,
        timeout: Duration,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<OpenAiGatewayConfig, ConfigValidationError> {
        let preset = self.preset()?;
        let mut config = OpenAiGatewayConfig::for_preset(preset)
            .with_model(self.name.trim())
            .with_temperature(self.temperature)
            .with_seed(self.seed)
            .with_timeout(timeout);
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(var) = self.api_key_var()? {
            match lookup(&var).filter(|key| !key.trim().is_empty()) {
                Some(key) => config = config.with_api_key(key),
                None => return Err(ConfigValidationError::MissingApiKey(var)),
            }
        }
        Ok(config)
    }
}
