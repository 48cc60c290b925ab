//! Progress notification port
//!
//! Callbacks fired while a user turn runs, so the presentation layer can show
//! a spinner while the model thinks and a panel for each tool call.

use querymind_domain::ToolCall;

/// Callback for progress updates during a user turn
///
/// All methods default to no-ops.
pub trait QueryProgressNotifier: Send + Sync {
    /// Called before each model invocation (`round` starts at 1)
    fn on_model_start(&self, _round: usize, _max_rounds: usize) {}

    /// Called when the model has answered
    fn on_model_end(&self) {}

    /// Called before a tool call is dispatched
    fn on_tool_start(&self, _call: &ToolCall) {}

    /// Called with the tool-result text appended to the history
    fn on_tool_result(&self, _call: &ToolCall, _content: &str, _is_error: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoQueryProgress;

impl QueryProgressNotifier for NoQueryProgress {}
