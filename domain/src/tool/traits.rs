//! Tool domain traits
//!
//! Pure validation of a [`ToolCall`] against its [`ToolDefinition`]. The async
//! `ToolExecutorPort` lives in the application layer.

use super::entities::{ToolCall, ToolDefinition, ToolParameter};
use serde_json::Value;

/// Validator for tool calls
pub trait ToolValidator {
    /// Validate a tool call against its definition
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), String>;
}

/// Checks presence, unknown names, JSON type and integer minimum.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), String> {
        for param in &definition.parameters {
            match call.arguments.get(&param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(format!(
                        "Missing required parameter '{}' for tool '{}'",
                        param.name, definition.name
                    ));
                }
                None | Some(Value::Null) => {}
                Some(value) => check_value(param, value, &definition.name)?,
            }
        }

        // Sorted so the reported name is stable across HashMap orderings
        let mut unknown: Vec<&str> = call
            .arguments
            .keys()
            .map(String::as_str)
            .filter(|name| definition.parameter(name).is_none())
            .collect();
        unknown.sort_unstable();
        if let Some(name) = unknown.first() {
            return Err(format!(
                "Unknown parameter '{}' for tool '{}'",
                name, definition.name
            ));
        }

        Ok(())
    }
}

fn check_value(param: &ToolParameter, value: &Value, tool: &str) -> Result<(), String> {
    let type_ok = match param.param_type.as_str() {
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        _ => value.is_string(),
    };
    if !type_ok {
        return Err(format!(
            "Parameter '{}' for tool '{}' must be of type {}, got {}",
            param.name,
            tool,
            param.param_type,
            json_type_name(value)
        ));
    }

    if let Some(minimum) = param.minimum {
        let below = match value.as_i64() {
            Some(n) => n < minimum,
            // u64 beyond i64::MAX is never below an i64 minimum
            None => value.as_u64().is_none(),
        };
        if below {
            return Err(format!(
                "Parameter '{}' for tool '{}' must be at least {}, got {}",
                param.name, tool, minimum, value
            ));
        }
    }

    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::AccessMode;

    fn sample_definition() -> ToolDefinition {
        ToolDefinition::new("sample_table", "Sample rows", AccessMode::ReadOnly)
            .with_parameter(ToolParameter::new("reasoning", "Why", true))
            .with_parameter(ToolParameter::new("table_name", "Table", true))
            .with_parameter(
                ToolParameter::new("row_sample_size", "Rows", true)
                    .with_type("integer")
                    .with_minimum(1),
            )
    }

    fn valid_call() -> ToolCall {
        ToolCall::new("call_1", "sample_table")
            .with_arg("reasoning", "look at users")
            .with_arg("table_name", "users")
            .with_arg("row_sample_size", 3)
    }

    #[test]
    fn test_validator_valid_call() {
        assert!(DefaultToolValidator.validate(&valid_call(), &sample_definition()).is_ok());
    }

    #[test]
    fn test_validator_missing_required() {
        let mut call = valid_call();
        call.arguments.remove("reasoning");
        let err = DefaultToolValidator
            .validate(&call, &sample_definition())
            .unwrap_err();
        assert!(err.contains("Missing required parameter 'reasoning'"));
    }

    #[test]
    fn test_validator_null_counts_as_missing() {
        let call = valid_call().with_arg("table_name", Value::Null);
        let err = DefaultToolValidator
            .validate(&call, &sample_definition())
            .unwrap_err();
        assert!(err.contains("'table_name'"));
    }

    #[test]
    fn test_validator_unknown_param() {
        let call = valid_call().with_arg("limit", 5);
        let err = DefaultToolValidator
            .validate(&call, &sample_definition())
            .unwrap_err();
        assert!(err.contains("Unknown parameter 'limit'"));
    }

    #[test]
    fn test_validator_wrong_type() {
        let call = valid_call().with_arg("row_sample_size", "three");
        let err = DefaultToolValidator
            .validate(&call, &sample_definition())
            .unwrap_err();
        assert!(err.contains("must be of type integer, got string"));

        let call = valid_call().with_arg("row_sample_size", 2.5);
        let err = DefaultToolValidator
            .validate(&call, &sample_definition())
            .unwrap_err();
        assert!(err.contains("got number"));
    }

    #[test]
    fn test_validator_minimum() {
        let call = valid_call().with_arg("row_sample_size", 0);
        let err = DefaultToolValidator
            .validate(&call, &sample_definition())
            .unwrap_err();
        assert!(err.contains("must be at least 1, got 0"));
    }
}
