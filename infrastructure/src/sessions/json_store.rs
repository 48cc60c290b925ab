use querymind_application::{SessionRecord, SessionStore, SessionStoreError, SessionSummary};
use querymind_domain::SessionId;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Stores each session as pretty-printed JSON at `<dir>/<id>.json`.
///
/// Session ids are restricted to file-safe characters, so the id is used as
/// the file stem directly.
#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    dir: PathBuf,
}

impl JsonSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &SessionId) -> PathBuf {
        self.dir.join(format!("{}.json", id.as_str()))
    }

    fn read(&self, path: &Path, id: &SessionId) -> Result<SessionRecord, SessionStoreError> {
        let data = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SessionStoreError::NotFound(id.clone()),
            _ => SessionStoreError::Io(format!("{}: {}", path.display(), e)),
        })?;
        serde_json::from_str(&data).map_err(|e| SessionStoreError::Corrupt {
            id: id.clone(),
            reason: e.to_string(),
        })
    }
}

impl SessionStore for JsonSessionStore {
    fn load(&self, id: &SessionId) -> Result<SessionRecord, SessionStoreError> {
        let record = self.read(&self.path_for(id), id)?;
        debug!("Loaded session {} ({} entries)", id, record.transcript.len());
        Ok(record)
    }

    fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| SessionStoreError::Io(format!("{}: {}", self.dir.display(), e)))?;

        let data = serde_json::to_string_pretty(record)
            .map_err(|e| SessionStoreError::Io(e.to_string()))?;

        // Write to a sibling file first so a crash never leaves half a session
        let path = self.path_for(&record.id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| SessionStoreError::Io(format!("{}: {}", path.display(), e)))?;

        debug!("Saved session {} to {}", record.id, path.display());
        Ok(())
    }

    fn list(&self) -> Result<Vec<SessionSummary>, SessionStoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(SessionStoreError::Io(format!(
                    "{}: {}",
                    self.dir.display(),
                    e
                )));
            }
        };

        let mut summaries = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| SessionId::parse(s).ok())
            else {
                continue;
            };
            match self.read(&path, &id) {
                Ok(record) => summaries.push(SessionSummary::from(&record)),
                Err(e) => warn!("Skipping session file {}: {}", path.display(), e),
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    fn delete(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        let path = self.path_for(id);
        fs::remove_file(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SessionStoreError::NotFound(id.clone()),
            _ => SessionStoreError::Io(format!("{}: {}", path.display(), e)),
        })?;
        debug!("Deleted session {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use querymind_domain::{Conversation, Message, Role, Transcript, TranscriptEntry};

    fn id(raw: &str) -> SessionId {
        SessionId::parse(raw).unwrap()
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path().join("sessions"));

        let mut record = SessionRecord::new(id("s1")).with_database("/data/shop.db");
        record.update(Transcript::new(vec![
            TranscriptEntry::user("How many orders?"),
            TranscriptEntry::assistant("There are 42 orders."),
        ]));
        store.save(&record).unwrap();

        assert!(dir.path().join("sessions").join("s1.json").exists());
        let loaded = store.load(&id("s1")).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_restored_conversation_continues_the_chat() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());

        let mut conversation = Conversation::new("system prompt");
        conversation.push(Message::user("List the tables"));
        conversation.push(Message::assistant("There are two tables: users and orders."));

        let mut record = SessionRecord::new(id("chat"));
        record.update(conversation.transcript());
        store.save(&record).unwrap();

        let restored = Conversation::restore("system prompt", &store.load(&id("chat")).unwrap().transcript);
        let roles: Vec<Role> = restored.messages().iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
        assert_eq!(
            restored.last().map(|m| m.text()),
            Some("There are two tables: users and orders.")
        );
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());
        assert!(matches!(
            store.load(&id("nope")),
            Err(SessionStoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        let store = JsonSessionStore::new(dir.path());
        assert!(matches!(
            store.load(&id("bad")),
            Err(SessionStoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_list_newest_first_and_skips_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());

        let mut older = SessionRecord::new(id("older"));
        older.update(Transcript::new(vec![TranscriptEntry::user("first question")]));
        older.updated_at = Utc::now() - Duration::hours(2);
        store.save(&older).unwrap();

        let newer = SessionRecord::new(id("newer"));
        store.save(&newer).unwrap();

        fs::write(dir.path().join("broken.json"), "[]").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let summaries = store.list().unwrap();
        let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "older"]);
        assert_eq!(summaries[1].preview.as_deref(), Some("first question"));
        assert_eq!(summaries[1].messages, 1);
    }

    #[test]
    fn test_delete_removes_only_that_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());
        store.save(&SessionRecord::new(id("keep"))).unwrap();
        store.save(&SessionRecord::new(id("drop"))).unwrap();

        store.delete(&id("drop")).unwrap();

        assert!(matches!(
            store.load(&id("drop")),
            Err(SessionStoreError::NotFound(_))
        ));
        let ids: Vec<String> = store.list().unwrap().iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["keep"]);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());
        assert!(matches!(
            store.delete(&id("ghost")),
            Err(SessionStoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_without_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path().join("missing"));
        assert!(store.list().unwrap().is_empty());
    }
}
