//! Execution parameters for the conversation loop.
//!
//! [`ExecutionParams`] groups the static parameters that bound one user turn
//! in [`RunQueryUseCase`](crate::use_cases::run_query::RunQueryUseCase).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Loop control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Maximum model rounds per user turn before `IterationLimitExceeded`.
    pub max_iterations: usize,
    /// Wall-clock budget for one model invocation.
    pub model_timeout: Duration,
    /// Wall-clock budget for one tool execution.
    pub tool_timeout: Duration,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model_timeout: Duration::from_secs(120),
            tool_timeout: Duration::from_secs(30),
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }
}
