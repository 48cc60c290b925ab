//! LLM Gateway port
//!
//! Defines the chat-model capability the conversation loop consumes: given the
//! full ordered history and the advertised tools, return one assistant message.

use async_trait::async_trait;
use querymind_domain::Message;
use thiserror::Error;

/// Phrases providers use when a usage limit is hit.
const USAGE_LIMIT_PHRASES: [&str; 3] = ["limit exceeded", "rate limit", "quota exceeded"];

/// Errors that can occur during model invocation
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// True when the provider refused because of a rate limit or quota.
    ///
    /// Besides [`GatewayError::RateLimited`], any error whose text mentions a
    /// known usage-limit phrase counts, since providers report these in free text.
    pub fn is_usage_limit(&self) -> bool {
        if matches!(self, GatewayError::RateLimited(_)) {
            return true;
        }
        let text = self.to_string().to_lowercase();
        USAGE_LIMIT_PHRASES.iter().any(|phrase| text.contains(phrase))
    }
}

/// Gateway for model communication
///
/// Implementations (adapters) live in the infrastructure layer. The gateway
/// is stateless between calls: the whole history is sent every time.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Model identifier, for logs and banners
    fn model_name(&self) -> &str;

    /// Invoke the model with the ordered history and the tool schemas.
    ///
    /// Returns an assistant message carrying optional text and zero or more
    /// tool calls.
    async fn invoke(
        &self,
        messages: &[Message],
        tools: &[serde_json::Value],
    ) -> Result<Message, GatewayError>;
}
