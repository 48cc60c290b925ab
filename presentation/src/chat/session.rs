//! The chat the REPL is working on: its conversation, its saved record and
//! where that record goes.

use querymind_application::{SessionRecord, SessionStore, SessionStoreError};
use querymind_domain::{Conversation, SessionId};
use std::sync::Arc;

pub struct ChatSession {
    conversation: Conversation,
    record: SessionRecord,
    store: Option<Arc<dyn SessionStore>>,
}

impl ChatSession {
    pub fn new(conversation: Conversation, record: SessionRecord) -> Self {
        Self {
            conversation,
            record,
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    /// Write the current transcript. A no-op without a store.
    pub fn save(&mut self, database: Option<String>) -> Result<(), SessionStoreError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        self.record.update(self.conversation.transcript());
        self.record.database = database;
        store.save(&self.record)
    }

    /// Forget the messages of this chat, keeping its id and title.
    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    /// Switch to a fresh chat with a new id. The previous one stays saved.
    pub fn start_new(&mut self) -> &SessionId {
        self.conversation.clear();
        self.record = SessionRecord::new(SessionRecord::generate_id());
        &self.record.id
    }

    /// Delete a saved chat. Deleting the current one also starts a new chat.
    pub fn delete(&mut self, id: &SessionId) -> Result<(), SessionStoreError> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| SessionStoreError::Io("sessions are disabled".to_string()))?;
        store.delete(id)?;
        if *id == self.record.id {
            self.start_new();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querymind_application::SessionSummary;
    use querymind_domain::Message;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<HashMap<SessionId, SessionRecord>>,
    }

    impl MemoryStore {
        fn get(&self, id: &SessionId) -> Option<SessionRecord> {
            self.records.lock().unwrap().get(id).cloned()
        }
    }

    impl SessionStore for MemoryStore {
        fn load(&self, id: &SessionId) -> Result<SessionRecord, SessionStoreError> {
            self.get(id)
                .ok_or_else(|| SessionStoreError::NotFound(id.clone()))
        }

        fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
            self.records
                .lock()
                .unwrap()
                .insert(record.id.clone(), record.clone());
            Ok(())
        }

        fn list(&self) -> Result<Vec<SessionSummary>, SessionStoreError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .map(SessionSummary::from)
                .collect())
        }

        fn delete(&self, id: &SessionId) -> Result<(), SessionStoreError> {
            self.records
                .lock()
                .unwrap()
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| SessionStoreError::NotFound(id.clone()))
        }
    }

    fn chatted(store: &Arc<MemoryStore>) -> ChatSession {
        let mut session = ChatSession::new(
            Conversation::new("persona"),
            SessionRecord::new(SessionId::parse("first").unwrap()),
        )
        .with_store(store.clone());
        session.conversation_mut().push(Message::user("How many users?"));
        session.conversation_mut().push(Message::assistant("Three."));
        session.save(Some("shop.db".to_string())).unwrap();
        session
    }

    #[test]
    fn test_save_records_transcript_and_database() {
        let store = Arc::new(MemoryStore::default());
        let session = chatted(&store);

        let saved = store.get(&session.record().id).unwrap();
        assert_eq!(saved.transcript.len(), 2);
        assert_eq!(saved.database.as_deref(), Some("shop.db"));
    }

    #[test]
    fn test_clear_keeps_the_session_and_empties_it() {
        let store = Arc::new(MemoryStore::default());
        let mut session = chatted(&store);

        session.clear();
        session.save(None).unwrap();

        assert_eq!(session.conversation(), &Conversation::new("persona"));
        let saved = store.get(&SessionId::parse("first").unwrap()).unwrap();
        assert!(saved.transcript.is_empty());
    }

    #[test]
    fn test_start_new_leaves_the_old_chat_saved() {
        let store = Arc::new(MemoryStore::default());
        let mut session = chatted(&store);

        let new_id = session.start_new().clone();
        session.save(None).unwrap();

        assert_ne!(new_id.as_str(), "first");
        assert!(session.conversation().is_empty());
        assert_eq!(store.get(&SessionId::parse("first").unwrap()).unwrap().transcript.len(), 2);
        assert!(store.get(&new_id).is_some());
    }

    #[test]
    fn test_delete_current_chat_starts_a_new_one() {
        let store = Arc::new(MemoryStore::default());
        let mut session = chatted(&store);
        let first = SessionId::parse("first").unwrap();

        session.delete(&first).unwrap();

        assert!(store.get(&first).is_none());
        assert_ne!(session.record().id, first);
        assert!(session.conversation().is_empty());
        assert!(matches!(
            session.delete(&first),
            Err(SessionStoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_without_store_save_is_a_no_op_and_delete_fails() {
        let mut session = ChatSession::new(
            Conversation::new("persona"),
            SessionRecord::new(SessionId::parse("solo").unwrap()),
        );
        assert!(session.save(None).is_ok());
        assert!(session.delete(&SessionId::parse("solo").unwrap()).is_err());
    }
}
