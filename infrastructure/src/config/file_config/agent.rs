//! Agent configuration from TOML (`[agent]` section)

use querymind_application::ExecutionParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw agent loop configuration from TOML
///
/// ```toml
/// [agent]
/// max_iterations = 10
/// model_timeout_seconds = 120
/// tool_timeout_seconds = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Model rounds per request before giving up
    pub max_iterations: usize,
    pub model_timeout_seconds: u64,
    pub tool_timeout_seconds: u64,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        let defaults = ExecutionParams::default();
        Self {
            max_iterations: defaults.max_iterations,
            model_timeout_seconds: defaults.model_timeout.as_secs(),
            tool_timeout_seconds: defaults.tool_timeout.as_secs(),
        }
    }
}

impl FileAgentConfig {
    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_max_iterations(self.max_iterations)
            .with_model_timeout(Duration::from_secs(self.model_timeout_seconds))
            .with_tool_timeout(Duration::from_secs(self.tool_timeout_seconds))
    }
}
