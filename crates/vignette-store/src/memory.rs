//! In-memory RecordStore for tests and development

use crate::StoreError;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use vignette_domain::RecordStore;

/// In-memory key-value store
///
/// Clones share the same underlying map, so a test can hand one handle to
/// a client and inspect the same contents through another.
///
/// # Examples
///
/// ```
/// use vignette_store::MemoryStore;
/// use vignette_domain::RecordStore;
///
/// let mut store = MemoryStore::new();
/// store.put("studyData_x", "{}").unwrap();
/// assert_eq!(store.get("studyData_x").unwrap().as_deref(), Some("{}"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for MemoryStore {
    type Error = StoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), Self::Error> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, Self::Error> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.put("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        store.put("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));

        store.delete("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);

        // Deleting an absent key is not an error
        store.delete("a").unwrap();
    }

    #[test]
    fn test_prefix_listing() {
        let mut store = MemoryStore::new();
        store.put("queuedStudyData_1", "{}").unwrap();
        store.put("queuedStudyData_2", "{}").unwrap();
        store.put("studyData_1", "{}").unwrap();

        let keys = store.keys_with_prefix("queuedStudyData_").unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| k.starts_with("queuedStudyData_")));
    }

    #[test]
    fn test_clones_share_contents() {
        let mut store = MemoryStore::new();
        let viewer = store.clone();

        store.put("a", "1").unwrap();
        assert_eq!(viewer.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(viewer.len(), 1);
    }
}
