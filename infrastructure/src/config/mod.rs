//! Configuration file loading for querymind
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `QUERYMIND_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./querymind.toml` or `./.querymind.toml`
//! 4. Global: `$XDG_CONFIG_HOME/querymind/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, ConfigValidationError, FileAgentConfig, FileConfig, FileLoggingConfig,
    FileModelConfig, FileReplConfig, FileSessionsConfig, FileToolsConfig, Severity,
};
pub use loader::ConfigLoader;
