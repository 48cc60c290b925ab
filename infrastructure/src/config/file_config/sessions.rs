//! Session persistence configuration from TOML (`[sessions]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionsConfig {
    pub enabled: bool,
    /// Defaults to `<data dir>/querymind/sessions`
    pub directory: Option<String>,
}

impl Default for FileSessionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
        }
    }
}

impl FileSessionsConfig {
    pub fn resolved_directory(&self) -> Option<PathBuf> {
        match &self.directory {
            Some(dir) => Some(PathBuf::from(dir)),
            None => dirs::data_dir().map(|d| d.join("querymind").join("sessions")),
        }
    }
}
