//! Model gateway adapters.
//!
//! [`OpenAiCompatibleGateway`] implements the
//! [`LlmGateway`](querymind_application::LlmGateway) port over any
//! OpenAI-style `/chat/completions` endpoint (Groq, Ollama, OpenAI).

mod openai;
mod provider;

pub use openai::{OpenAiCompatibleGateway, OpenAiGatewayConfig};
pub use provider::{DEFAULT_MODEL, DEFAULT_SEED, DEFAULT_TEMPERATURE, ProviderPreset};
