//! The closed set of database tools.
//!
//! [`DatabaseTool`] names each tool and owns its definition. [`DatabaseToolCall`]
//! is the statically typed form of a [`ToolCall`], produced by
//! [`DatabaseToolCall::parse`] once the generic validator has accepted it.

use super::entities::{AccessMode, ToolCall, ToolDefinition, ToolParameter, ToolSpec};
use super::value_objects::ToolError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;

pub const LIST_TABLES: &str = "list_tables";
pub const SAMPLE_TABLE: &str = "sample_table";
pub const DESCRIBE_TABLE: &str = "describe_table";
pub const EXECUTE_SQL: &str = "execute_sql";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseTool {
    ListTables,
    SampleTable,
    DescribeTable,
    ExecuteSql,
}

impl DatabaseTool {
    /// Every tool, in the order advertised to the model.
    pub const ALL: [DatabaseTool; 4] = [
        DatabaseTool::ListTables,
        DatabaseTool::SampleTable,
        DatabaseTool::DescribeTable,
        DatabaseTool::ExecuteSql,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DatabaseTool::ListTables => LIST_TABLES,
            DatabaseTool::SampleTable => SAMPLE_TABLE,
            DatabaseTool::DescribeTable => DESCRIBE_TABLE,
            DatabaseTool::ExecuteSql => EXECUTE_SQL,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// `execute_sql` is always treated as mutating; the statement text is not inspected.
    pub fn access(&self) -> AccessMode {
        match self {
            DatabaseTool::ExecuteSql => AccessMode::ReadWrite,
            _ => AccessMode::ReadOnly,
        }
    }

    /// Console title for this tool
    pub fn title(&self) -> &'static str {
        match self {
            DatabaseTool::ListTables => "List Tables",
            DatabaseTool::SampleTable => "Sample Table",
            DatabaseTool::DescribeTable => "Describe Table",
            DatabaseTool::ExecuteSql => "Execute SQL",
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        match self {
            DatabaseTool::ListTables => ToolDefinition::new(
                LIST_TABLES,
                "List every user-created table in the database. SQLite internal tables are excluded. \
                 Returns a list of table names.",
                self.access(),
            )
            .with_parameter(reasoning_parameter(
                "Why you need the table list, related to the user's request",
            )),
            DatabaseTool::SampleTable => ToolDefinition::new(
                SAMPLE_TABLE,
                "Fetch a few rows from one table to see what its data looks like. \
                 Returns one row per line, each row as a tuple of column values.",
                self.access(),
            )
            .with_parameter(reasoning_parameter(
                "Why you need sample data from this table",
            ))
            .with_parameter(table_name_parameter("sample"))
            .with_parameter(
                ToolParameter::new(
                    "row_sample_size",
                    "How many rows to fetch; 3 to 5 keeps the output readable",
                    true,
                )
                .with_type("integer")
                .with_minimum(1),
            ),
            DatabaseTool::DescribeTable => ToolDefinition::new(
                DESCRIBE_TABLE,
                "Show the schema of one table: one line per column with its position, name, \
                 declared type, NOT NULL flag, default value and primary-key position.",
                self.access(),
            )
            .with_parameter(reasoning_parameter(
                "Why you need this table's structure",
            ))
            .with_parameter(table_name_parameter("describe")),
            DatabaseTool::ExecuteSql => ToolDefinition::new(
                EXECUTE_SQL,
                "Run one SQL statement exactly as written and return its result rows, one tuple \
                 per line. Changes are committed when the statement succeeds. Send one \
                 statement per call; text with several statements is rejected.",
                self.access(),
            )
            .with_parameter(reasoning_parameter("Why this statement is being run"))
            .with_parameter(ToolParameter::new(
                "sql_query",
                "One complete SQLite statement",
                true,
            )),
        }
    }
}

impl std::fmt::Display for DatabaseTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn reasoning_parameter(description: &str) -> ToolParameter {
    ToolParameter::new("reasoning", description, true)
}

fn table_name_parameter(verb: &str) -> ToolParameter {
    ToolParameter::new(
        "table_name",
        format!("Name of the table to {verb}, as listed by list_tables, without quotes"),
        true,
    )
}

/// Registry of the four database tools in their advertised order.
pub fn database_tool_spec() -> ToolSpec {
    DatabaseTool::ALL
        .iter()
        .fold(ToolSpec::new(), |spec, tool| spec.register(tool.definition()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListTablesArgs {
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SampleTableArgs {
    pub reasoning: String,
    pub table_name: String,
    pub row_sample_size: NonZeroU32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescribeTableArgs {
    pub reasoning: String,
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecuteSqlArgs {
    pub reasoning: String,
    pub sql_query: String,
}

/// A tool call with its arguments decoded into the tool's own struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseToolCall {
    ListTables(ListTablesArgs),
    SampleTable(SampleTableArgs),
    DescribeTable(DescribeTableArgs),
    ExecuteSql(ExecuteSqlArgs),
}

impl DatabaseToolCall {
    pub fn parse(call: &ToolCall) -> Result<Self, ToolError> {
        let tool = DatabaseTool::from_name(&call.tool_name).ok_or_else(|| {
            ToolError::not_found(format!("Unknown tool '{}'", call.tool_name))
        })?;

        Ok(match tool {
            DatabaseTool::ListTables => Self::ListTables(decode(call)?),
            DatabaseTool::SampleTable => Self::SampleTable(decode(call)?),
            DatabaseTool::DescribeTable => Self::DescribeTable(decode(call)?),
            DatabaseTool::ExecuteSql => Self::ExecuteSql(decode(call)?),
        })
    }

    pub fn tool(&self) -> DatabaseTool {
        match self {
            Self::ListTables(_) => DatabaseTool::ListTables,
            Self::SampleTable(_) => DatabaseTool::SampleTable,
            Self::DescribeTable(_) => DatabaseTool::DescribeTable,
            Self::ExecuteSql(_) => DatabaseTool::ExecuteSql,
        }
    }

    pub fn reasoning(&self) -> &str {
        match self {
            Self::ListTables(a) => &a.reasoning,
            Self::SampleTable(a) => &a.reasoning,
            Self::DescribeTable(a) => &a.reasoning,
            Self::ExecuteSql(a) => &a.reasoning,
        }
    }
}

fn decode<T: DeserializeOwned>(call: &ToolCall) -> Result<T, ToolError> {
    serde_json::from_value(call.arguments_json()).map_err(|e| {
        ToolError::invalid_argument(format!("Invalid arguments for tool '{}': {}", call.tool_name, e))
    })
}
