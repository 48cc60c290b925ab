//! Per-session database targets.
//!
//! Each chat session selects at most one database file. The registry maps
//! session ids to targets so one session switching files never redirects
//! another session's queries.

use super::error::DatabaseError;
use super::session::ScopedSession;
use querymind_domain::{AccessMode, SessionId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// A database file selected by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTarget {
    path: PathBuf,
}

impl DatabaseTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Display for DatabaseTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Shared map from session id to its active database.
#[derive(Debug, Clone, Default)]
pub struct DatabaseRegistry {
    targets: Arc<RwLock<HashMap<SessionId, DatabaseTarget>>>,
}

impl DatabaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `session` at `path` after checking it is a readable SQLite file.
    ///
    /// On failure the session keeps its previous target.
    pub fn select(
        &self,
        session: &SessionId,
        path: impl AsRef<Path>,
    ) -> Result<DatabaseTarget, DatabaseError> {
        let target = DatabaseTarget::new(path.as_ref());
        probe(&target)?;

        self.targets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.clone(), target.clone());
        info!("Session {} connected to {}", session, target);
        Ok(target)
    }

    pub fn clear(&self, session: &SessionId) -> Option<DatabaseTarget> {
        self.targets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session)
    }

    pub fn target(&self, session: &SessionId) -> Option<DatabaseTarget> {
        self.targets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .cloned()
    }

    /// A handle bound to one session.
    pub fn handle(&self, session: SessionId) -> DatabaseHandle {
        DatabaseHandle {
            registry: self.clone(),
            session,
        }
    }
}

/// Reads the first page so non-database files are rejected at selection time.
fn probe(target: &DatabaseTarget) -> Result<(), DatabaseError> {
    ScopedSession::acquire(Some(target), AccessMode::ReadOnly)?
        .run(|conn| {
            conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
                row.get::<_, i64>(0)
            })?;
            Ok(())
        })
        .map_err(|e| match e {
            DatabaseError::Query(inner) => DatabaseError::unavailable(format!(
                "{} is not a readable SQLite database: {}",
                target, inner
            )),
            other => other,
        })
}

/// The database of one session: what the tool executor reads its target from.
#[derive(Debug, Clone)]
pub struct DatabaseHandle {
    registry: DatabaseRegistry,
    session: SessionId,
}

impl DatabaseHandle {
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn target(&self) -> Option<DatabaseTarget> {
        self.registry.target(&self.session)
    }

    pub fn select(&self, path: impl AsRef<Path>) -> Result<DatabaseTarget, DatabaseError> {
        self.registry.select(&self.session, path)
    }

    pub fn clear(&self) -> Option<DatabaseTarget> {
        self.registry.clear(&self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn make_db(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE t (x INTEGER);")
            .unwrap();
        path
    }

    fn sid(s: &str) -> SessionId {
        SessionId::parse(s).unwrap()
    }

    #[test]
    fn test_sessions_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let a_db = make_db(dir.path(), "a.db");
        let b_db = make_db(dir.path(), "b.db");
        let registry = DatabaseRegistry::new();

        let alice = registry.handle(sid("alice"));
        let bob = registry.handle(sid("bob"));
        alice.select(&a_db).unwrap();
        assert!(bob.target().is_none());

        bob.select(&b_db).unwrap();
        assert_eq!(alice.target().unwrap().path(), a_db.as_path());
        assert_eq!(bob.target().unwrap().path(), b_db.as_path());

        alice.clear();
        assert!(alice.target().is_none());
        assert!(bob.target().is_some());
    }

    #[test]
    fn test_select_rejects_missing_and_garbage_files() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DatabaseRegistry::new();
        let session = sid("s1");

        let err = registry
            .select(&session, dir.path().join("missing.db"))
            .unwrap_err();
        assert!(err.is_unavailable());

        let garbage = dir.path().join("notes.txt");
        std::fs::write(&garbage, "this is not a database, just some plain text padding it out").unwrap();
        let err = registry.select(&session, &garbage).unwrap_err();
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("not a readable SQLite database"));
        assert!(registry.target(&session).is_none());
    }

    #[test]
    fn test_failed_select_keeps_previous_target() {
        let dir = tempfile::tempdir().unwrap();
        let good = make_db(dir.path(), "good.db");
        let handle = DatabaseRegistry::new().handle(sid("s1"));

        handle.select(&good).unwrap();
        assert!(handle.select(dir.path().join("missing.db")).is_err());
        assert_eq!(handle.target().unwrap().path(), good.as_path());
    }
}
