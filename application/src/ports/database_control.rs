//! Database control port
//!
//! Lets the REPL inspect and switch the session's database directly, outside
//! the conversation loop (`/tables`, `/open`).

use async_trait::async_trait;
use querymind_domain::ToolError;

#[async_trait]
pub trait DatabaseControl: Send + Sync {
    /// Display path of the connected database, if any
    fn current(&self) -> Option<String>;

    /// Point the session at another database file.
    ///
    /// On failure the previous database stays connected and the reason is
    /// returned for display.
    fn open(&self, path: &str) -> Result<String, String>;

    /// User tables of the connected database
    async fn list_tables(&self) -> Result<Vec<String>, ToolError>;
}
