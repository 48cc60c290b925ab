//! Provider presets for OpenAI-compatible chat endpoints.

use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TEMPERATURE: f32 = 0.4;
pub const DEFAULT_SEED: u64 = 42;

/// Known chat-completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderPreset {
    Groq,
    Ollama,
    OpenAi,
}

impl ProviderPreset {
    pub const ALL: [ProviderPreset; 3] = [
        ProviderPreset::Groq,
        ProviderPreset::Ollama,
        ProviderPreset::OpenAi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderPreset::Groq => "groq",
            ProviderPreset::Ollama => "ollama",
            ProviderPreset::OpenAi => "openai",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            ProviderPreset::Groq => "https://api.groq.com/openai/v1",
            ProviderPreset::Ollama => "http://localhost:11434/v1",
            ProviderPreset::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Environment variable holding the API key, if the provider needs one.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderPreset::Groq => Some("GROQ_API_KEY"),
            ProviderPreset::Ollama => None,
            ProviderPreset::OpenAi => Some("OPENAI_API_KEY"),
        }
    }
}

impl fmt::Display for ProviderPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| {
                format!(
                    "unknown provider '{}' (expected one of: {})",
                    s,
                    Self::ALL.map(|p| p.as_str()).join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_presets() {
        assert_eq!("groq".parse::<ProviderPreset>(), Ok(ProviderPreset::Groq));
        assert_eq!(" Ollama ".parse::<ProviderPreset>(), Ok(ProviderPreset::Ollama));
        let err = "bedrock".parse::<ProviderPreset>().unwrap_err();
        assert!(err.contains("groq, ollama, openai"));
    }

    #[test]
    fn test_groq_defaults() {
        assert_eq!(ProviderPreset::Groq.base_url(), "https://api.groq.com/openai/v1");
        assert_eq!(ProviderPreset::Groq.api_key_env(), Some("GROQ_API_KEY"));
        assert_eq!(ProviderPreset::Ollama.api_key_env(), None);
    }
}
