//! Tool dispatch.
//!
//! Turns one model-requested [`ToolCall`] into exactly one tool-result
//! [`Message`]. Dispatch is total: unknown tools, bad arguments, timeouts and
//! executor failures all come back as an error tool-result whose text starts
//! with `Error: `, so the conversation loop never aborts because of a tool.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::tool_helpers::tool_args_preview;
use querymind_domain::core::string::truncate;
use querymind_domain::tool::entities::{ToolCall, ToolSpec};
use querymind_domain::tool::traits::{DefaultToolValidator, ToolValidator};
use querymind_domain::tool::value_objects::ToolError;
use querymind_domain::Message;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Prefix of every error tool-result.
pub const ERROR_PREFIX: &str = "Error: ";

/// Render a tool error the way the model sees it.
pub fn error_text(error: &ToolError) -> String {
    format!("{}{}", ERROR_PREFIX, error.message)
}

/// Resolves, validates and executes tool calls under a timeout.
pub struct ToolDispatcher {
    tool_executor: Arc<dyn ToolExecutorPort>,
    validator: DefaultToolValidator,
    timeout: Duration,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl ToolDispatcher {
    pub fn new(tool_executor: Arc<dyn ToolExecutorPort>, timeout: Duration) -> Self {
        Self {
            tool_executor,
            validator: DefaultToolValidator,
            timeout,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn tool_spec(&self) -> &ToolSpec {
        self.tool_executor.tool_spec()
    }

    /// Dispatch one call. Never fails; the result is tagged with `call.id`.
    pub async fn dispatch(&self, call: &ToolCall) -> Message {
        info!(
            "Tool {} [{}]: {}",
            call.tool_name,
            call.id,
            tool_args_preview(call)
        );
        if let Some(reasoning) = call.reasoning() {
            debug!("Reasoning: {}", truncate(reasoning, 200));
        }
        self.conversation_logger.log(ConversationEvent::new(
            "tool_call",
            serde_json::json!({
                "call_id": call.id,
                "tool": call.tool_name,
                "arguments": call.arguments_json(),
            }),
        ));

        let started = Instant::now();
        let outcome = self.try_dispatch(call).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (content, is_error) = match outcome {
            Ok(output) => {
                debug!(
                    "Tool {} succeeded in {}ms ({} bytes)",
                    call.tool_name,
                    duration_ms,
                    output.len()
                );
                (output, false)
            }
            Err(error) => {
                warn!("Tool {} failed: {}", call.tool_name, error);
                (error_text(&error), true)
            }
        };

        self.conversation_logger.log(ConversationEvent::new(
            "tool_result",
            serde_json::json!({
                "call_id": call.id,
                "tool": call.tool_name,
                "is_error": is_error,
                "duration_ms": duration_ms,
                "bytes": content.len(),
                "preview": truncate(&content, 200),
            }),
        ));

        Message::tool_result(call, content, is_error)
    }

    async fn try_dispatch(&self, call: &ToolCall) -> Result<String, ToolError> {
        let definition = self.tool_spec().resolve(&call.tool_name)?;
        self.validator
            .validate(call, definition)
            .map_err(ToolError::invalid_argument)?;

        let result = self.tool_executor.execute_within(call, self.timeout).await;

        if result.is_success() {
            Ok(result.output.unwrap_or_default())
        } else {
            Err(result
                .error
                .unwrap_or_else(|| ToolError::execution_failed("Unknown error")))
        }
    }
}
