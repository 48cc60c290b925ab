//! Tool configuration from TOML (`[tools]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Only accept table names that exist in the schema (case-insensitive)
    pub strict_identifiers: bool,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        Self {
            strict_identifiers: true,
        }
    }
}
