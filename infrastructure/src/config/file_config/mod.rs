//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types at
//! wiring time.

mod agent;
mod logging;
mod model;
mod repl;
mod sessions;
mod tools;

pub use agent::FileAgentConfig;
pub use logging::FileLoggingConfig;
pub use model::FileModelConfig;
pub use repl::FileReplConfig;
pub use sessions::FileSessionsConfig;
pub use tools::FileToolsConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors that prevent building the model gateway
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("unknown provider '{0}' (expected groq, ollama or openai)")]
    UnknownProvider(String),

    #[error("environment variable {0} is not set; it must hold the model provider's API key")]
    MissingApiKey(String),
}

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted key, e.g. `agent.max_iterations`
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field,
            message: message.into(),
        }
    }

    fn warning(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field,
            message: message.into(),
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model provider and sampling
    pub model: FileModelConfig,
    /// Conversation loop bounds
    pub agent: FileAgentConfig,
    /// Tool behaviour
    pub tools: FileToolsConfig,
    /// Conversation log
    pub logging: FileLoggingConfig,
    /// Transcript persistence
    pub sessions: FileSessionsConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.model.name.trim().is_empty() {
            issues.push(ConfigIssue::error("model.name", "model name cannot be empty"));
        }
        if let Err(e) = self.model.preset() {
            issues.push(ConfigIssue::error("model.provider", e.to_string()));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            issues.push(ConfigIssue::warning(
                "model.temperature",
                format!(
                    "temperature {} is outside 0.0-2.0 and may be rejected by the provider",
                    self.model.temperature
                ),
            ));
        }

        if self.agent.max_iterations == 0 {
            issues.push(ConfigIssue::error(
                "agent.max_iterations",
                "max_iterations must be at least 1",
            ));
        }
        if self.agent.model_timeout_seconds == 0 {
            issues.push(ConfigIssue::error(
                "agent.model_timeout_seconds",
                "model_timeout_seconds cannot be 0",
            ));
        }
        if self.agent.tool_timeout_seconds == 0 {
            issues.push(ConfigIssue::error(
                "agent.tool_timeout_seconds",
                "tool_timeout_seconds cannot be 0",
            ));
        }

        issues
    }

    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}
