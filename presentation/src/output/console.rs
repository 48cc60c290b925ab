//! Console output for the chat REPL

use colored::Colorize;
use querymind_application::tool_args_preview;
use querymind_domain::ToolCall;

/// Message shown when the provider refuses because of a rate limit or quota.
pub const USAGE_LIMIT_MESSAGE: &str = "Usage limit exceeded. Please try again later.";

/// Formats REPL output for the terminal
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Startup banner
    pub fn banner(model: &str, database: Option<&str>) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("QueryMind"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Model:".cyan().bold(), model));
        output.push_str(&format!(
            "{} {}\n",
            "Database:".cyan().bold(),
            database.unwrap_or("(none)")
        ));
        output.push('\n');
        output.push_str(&format!(
            "Ask a question about your data. Type {} for commands, {} or {} to leave.\n",
            "/help".bold(),
            "exit".bold(),
            "quit".bold()
        ));
        output
    }

    /// Panel printed when the model calls a tool
    pub fn tool_panel(call: &ToolCall) -> String {
        let mut output = format!(
            "{} {}",
            "->".cyan(),
            call.tool_name.as_str().yellow().bold()
        );
        if let Some(table) = call.get_string("table_name") {
            output.push_str(&format!(" {}", table.bold()));
        }
        if let Some(sql) = call.get_string("sql_query") {
            output.push('\n');
            output.push_str(&Self::indent(sql, "   "));
        }
        if let Some(reasoning) = call.reasoning() {
            output.push('\n');
            output.push_str(&format!("   {}", reasoning.dimmed()));
        }
        output
    }

    /// One-line outcome of a tool call
    pub fn tool_outcome(call: &ToolCall, content: &str, is_error: bool) -> String {
        if is_error {
            format!("   {} {}", "x".red(), content.red())
        } else {
            let rows = if content.is_empty() {
                0
            } else {
                content.lines().count()
            };
            format!(
                "   {} {} ({} line{})",
                "v".green(),
                tool_args_preview(call).dimmed(),
                rows,
                if rows == 1 { "" } else { "s" }
            )
        }
    }

    /// The model's final Markdown answer
    pub fn answer(text: &str) -> String {
        let body = if text.trim().is_empty() {
            "(the model returned an empty answer)".dimmed().to_string()
        } else {
            text.to_string()
        };
        format!("\n{}\n{}\n", "Response:".green().bold(), body)
    }

    pub fn error(message: &str) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }

    pub fn usage_limit() -> String {
        USAGE_LIMIT_MESSAGE.yellow().bold().to_string()
    }

    pub fn table_list(tables: &[String]) -> String {
        if tables.is_empty() {
            return "No tables found.".dimmed().to_string();
        }
        let mut output = format!("{}\n", "Tables:".cyan().bold());
        for table in tables {
            output.push_str(&format!("  * {}\n", table));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_tool_panel_shows_sql_and_reasoning() {
        plain();
        let call = ToolCall::new("call_1", "execute_sql")
            .with_arg("reasoning", "count the users")
            .with_arg("sql_query", "SELECT COUNT(*)\nFROM users");

        let panel = ConsoleFormatter::tool_panel(&call);
        assert!(panel.starts_with("-> execute_sql"));
        assert!(panel.contains("   SELECT COUNT(*)\n   FROM users"));
        assert!(panel.ends_with("count the users"));
    }

    #[test]
    fn test_tool_outcome_counts_lines() {
        plain();
        let call = ToolCall::new("c", "sample_table")
            .with_arg("reasoning", "peek")
            .with_arg("table_name", "users");
        let ok = ConsoleFormatter::tool_outcome(&call, "(1, 'a')\n(2, 'b')", false);
        assert!(ok.contains("users (2 lines)"));

        let empty = ConsoleFormatter::tool_outcome(&call, "", false);
        assert!(empty.contains("(0 lines)"));

        let err = ConsoleFormatter::tool_outcome(&call, "Error: no such table", true);
        assert!(err.contains("x Error: no such table"));
    }

    #[test]
    fn test_empty_answer_has_placeholder() {
        plain();
        assert!(ConsoleFormatter::answer("").contains("empty answer"));
        assert!(ConsoleFormatter::answer("**42** rows").contains("**42** rows"));
    }

    #[test]
    fn test_table_list() {
        plain();
        assert_eq!(ConsoleFormatter::table_list(&[]), "No tables found.");
        let listed = ConsoleFormatter::table_list(&["users".to_string(), "orders".to_string()]);
        assert_eq!(listed, "Tables:\n  * users\n  * orders\n");
    }

    #[test]
    fn test_error_line() {
        plain();
        assert_eq!(ConsoleFormatter::error("boom"), "Error: boom");
        assert_eq!(ConsoleFormatter::usage_limit(), USAGE_LIMIT_MESSAGE);
    }
}
