//! Progress reporting while a request runs

use crate::output::console::ConsoleFormatter;
use indicatif::{ProgressBar, ProgressStyle};
use querymind_application::QueryProgressNotifier;
use querymind_domain::ToolCall;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Shows a spinner while the model thinks and a panel per tool call
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn clear_spinner(&self) {
        if let Some(pb) = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pb.finish_and_clear();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}

impl QueryProgressNotifier for ProgressReporter {
    fn on_model_start(&self, round: usize, max_rounds: usize) {
        self.clear_spinner();
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix("Thinking");
        pb.set_message(format!("(round {}/{})", round, max_rounds));
        pb.enable_steady_tick(Duration::from_millis(100));
        *self.spinner.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn on_model_end(&self) {
        self.clear_spinner();
    }

    fn on_tool_start(&self, call: &ToolCall) {
        println!("{}", ConsoleFormatter::tool_panel(call));
    }

    fn on_tool_result(&self, call: &ToolCall, content: &str, is_error: bool) {
        println!("{}", ConsoleFormatter::tool_outcome(call, content, is_error));
    }
}

/// Plain-text progress for `--quiet` and non-interactive output
pub struct SimpleProgress;

impl QueryProgressNotifier for SimpleProgress {
    fn on_tool_start(&self, call: &ToolCall) {
        println!("{}", ConsoleFormatter::tool_panel(call));
    }
}
