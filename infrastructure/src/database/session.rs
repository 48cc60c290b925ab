//! Scoped database session.
//!
//! One [`ScopedSession`] serves exactly one tool call: it opens the target
//! file, runs the tool body, and closes the connection on every exit path.
//! Read-write sessions wrap the body in a transaction that commits on success
//! and rolls back on failure, so a failed mutating call never partially
//! commits. Statements SQLite refuses inside a transaction (`VACUUM`,
//! `BEGIN`, `ATTACH`, journal-mode pragmas) run in autocommit instead; see
//! [`runs_outside_transaction`].

use super::error::DatabaseError;
use super::registry::DatabaseTarget;
use querymind_domain::AccessMode;
use rusqlite::{Connection, InterruptHandle, OpenFlags};
use std::time::Duration;
use tracing::{debug, warn};

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Leading keywords of statements that cannot run inside a transaction or
/// manage one themselves.
const AUTOCOMMIT_KEYWORDS: [&str; 10] = [
    "ATTACH", "BEGIN", "COMMIT", "DETACH", "END", "PRAGMA", "RELEASE", "ROLLBACK", "SAVEPOINT",
    "VACUUM",
];

/// True when `sql` must run outside the session's transaction.
///
/// Only the leading keyword is inspected, after whitespace and comments.
pub fn runs_outside_transaction(sql: &str) -> bool {
    let keyword: String = skip_comments(sql)
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    AUTOCOMMIT_KEYWORDS
        .iter()
        .any(|k| k.eq_ignore_ascii_case(&keyword))
}

fn skip_comments(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return sql;
        }
    }
}

pub struct ScopedSession {
    conn: Connection,
    access: AccessMode,
}

impl ScopedSession {
    /// Open a connection to `target`.
    ///
    /// The file is never created. A missing target, a missing file and an
    /// open failure all yield [`DatabaseError::Unavailable`].
    pub fn acquire(
        target: Option<&DatabaseTarget>,
        access: AccessMode,
    ) -> Result<Self, DatabaseError> {
        let target =
            target.ok_or_else(|| DatabaseError::unavailable("no database selected"))?;
        let path = target.path();
        if !path.is_file() {
            return Err(DatabaseError::unavailable(format!(
                "{} does not exist",
                path.display()
            )));
        }

        let mode = match access {
            AccessMode::ReadOnly => OpenFlags::SQLITE_OPEN_READ_ONLY,
            AccessMode::ReadWrite => OpenFlags::SQLITE_OPEN_READ_WRITE,
        };
        let conn = Connection::open_with_flags(path, mode | OpenFlags::SQLITE_OPEN_NO_MUTEX)
            .map_err(|e| {
                DatabaseError::unavailable(format!("cannot open {}: {}", path.display(), e))
            })?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| DatabaseError::unavailable(e.to_string()))?;

        debug!("Opened {} ({})", path.display(), access);
        Ok(Self { conn, access })
    }

    pub fn access(&self) -> AccessMode {
        self.access
    }

    /// Handle that stops the statement currently running on this connection.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.conn.get_interrupt_handle()
    }

    /// Run `body` and release the connection.
    pub fn run<T, F>(mut self, body: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        match self.access {
            AccessMode::ReadOnly => body(&self.conn),
            AccessMode::ReadWrite => {
                let tx = self.conn.transaction()?;
                match body(&*tx) {
                    Ok(value) => {
                        tx.commit()?;
                        Ok(value)
                    }
                    Err(e) => {
                        if let Err(rollback) = tx.rollback() {
                            warn!("Rollback failed: {}", rollback);
                        } else {
                            debug!("Rolled back after: {}", e);
                        }
                        Err(e)
                    }
                }
            }
        }
    }

    /// Run `body` without the session transaction.
    ///
    /// Each statement commits on its own, so a failure in a later statement
    /// does not undo an earlier one.
    pub fn run_autocommit<T, F>(self, body: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        debug!("Running outside a transaction ({})", self.access);
        body(&self.conn)
    }
}
