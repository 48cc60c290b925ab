//! Shared helpers for tool use cases.

use querymind_domain::core::string::preview;
use querymind_domain::tool::entities::ToolCall;

/// Extract a short, single-line preview of a tool call's arguments.
///
/// Prefers `sql_query`, then `table_name`, then falls back to `reasoning`.
pub fn tool_args_preview(call: &ToolCall) -> String {
    ["sql_query", "table_name", "reasoning"]
        .iter()
        .find_map(|key| call.get_string(key))
        .map(|s| preview(s, 60))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_preferred_over_reasoning() {
        let call = ToolCall::new("c1", "execute_sql")
            .with_arg("reasoning", "count users")
            .with_arg("sql_query", "SELECT COUNT(*)\nFROM users");
        assert_eq!(tool_args_preview(&call), "SELECT COUNT(*) FROM users");
    }

    #[test]
    fn test_table_name_preview() {
        let call = ToolCall::new("c1", "describe_table")
            .with_arg("reasoning", "schema")
            .with_arg("table_name", "orders");
        assert_eq!(tool_args_preview(&call), "orders");
    }

    #[test]
    fn test_fallback_and_empty() {
        let call = ToolCall::new("c1", "list_tables").with_arg("reasoning", "start exploring");
        assert_eq!(tool_args_preview(&call), "start exploring");
        assert_eq!(tool_args_preview(&ToolCall::new("c2", "list_tables")), "");
    }

    #[test]
    fn test_long_sql_is_truncated() {
        let sql = format!("SELECT {} FROM t", "a, ".repeat(40));
        let call = ToolCall::new("c1", "execute_sql").with_arg("sql_query", sql);
        let p = tool_args_preview(&call);
        assert!(p.len() <= 60);
        assert!(p.ends_with("..."));
    }
}
