//! SQLite-backed RecordStore

use crate::StoreError;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use vignette_domain::RecordStore;

/// SQLite-based implementation of RecordStore
///
/// Provides the durable key-value storage that keeps a participant's data
/// safe across process restarts when remote submission is unavailable.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its
/// own SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    /// The parent directory is created if it does not exist.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vignette_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("vignette.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory SqliteStore
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }
}

impl RecordStore for SqliteStore {
    type Error = StoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), Self::Error> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, Self::Error> {
        // LIKE special characters in a participant-id-scoped prefix do not
        // occur, but escape them anyway so the contract holds for any key.
        let pattern = format!(
            "{}%",
            prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
        );
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries WHERE key LIKE ?1 ESCAPE '\\' ORDER BY key")?;
        let keys = stmt
            .query_map(params![pattern], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vignette_domain::{queued_key, ParticipantId, QueuedSubmission, SessionContext, StudyRecord};

    #[test]
    fn test_put_get_roundtrip() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get("a").unwrap(), None);

        store.put("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        store.put("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));

        store.delete("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        store.delete("a").unwrap();
    }

    #[test]
    fn test_prefix_listing_escapes_like_wildcards() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.put("queuedStudyData_1", "{}").unwrap();
        store.put("queuedStudyData_2", "{}").unwrap();
        store.put("studyData_1", "{}").unwrap();

        let keys = store.keys_with_prefix("queuedStudyData_").unwrap();
        assert_eq!(keys.len(), 2);

        // The underscore in the prefix must match literally
        store.put("queuedStudyDataX3", "{}").unwrap();
        let keys = store.keys_with_prefix("queuedStudyData_").unwrap();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vignette.db");

        let id = ParticipantId::new();
        let queued = QueuedSubmission {
            data: StudyRecord::with_participant(id, SessionContext::default()),
            queue_time: chrono::Utc::now(),
            attempts: 4,
        };
        let json = serde_json::to_string(&queued).unwrap();

        {
            let mut store = SqliteStore::new(&path).unwrap();
            store.put(&queued_key(id), &json).unwrap();
        }

        let store = SqliteStore::new(&path).unwrap();
        let loaded = store.get(&queued_key(id)).unwrap().unwrap();
        let back: QueuedSubmission = serde_json::from_str(&loaded).unwrap();
        assert_eq!(back.attempts, 4);
        assert_eq!(back.data.participant_id(), id);
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("vignette.db");
        let store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert!(path.exists());
    }
}
