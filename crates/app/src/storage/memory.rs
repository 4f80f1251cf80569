use std::collections::BTreeMap;

use super::{KeyValueStore, StorageError, check_quota, entry_size};

/// In-memory store with the same size ceiling semantics as [`super::FileStore`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    limit: usize,
    unavailable: bool,
}

impl MemoryStore {
    /// Create an empty store holding at most `limit` bytes.
    #[must_use]
    pub const fn with_limit(limit: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            limit,
            unavailable: false,
        }
    }

    /// Create an effectively unbounded store.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::with_limit(usize::MAX)
    }

    /// Simulate a store that rejects every read and write.
    pub const fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Write a value without quota checks, e.g. to plant corrupt data.
    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    /// Bytes currently stored.
    #[must_use]
    pub fn used(&self) -> usize {
        self.entries.iter().map(|(k, v)| entry_size(k, v)).sum()
    }

    fn ensure_available(&self) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable("store disabled".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.ensure_available()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_available()?;
        let others: usize = self
            .entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| entry_size(k, v))
            .sum();
        check_quota(key, value, others, self.limit)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.ensure_available()?;
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut store = MemoryStore::unbounded();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_quota_rejects_and_keeps_previous_value() {
        let mut store = MemoryStore::with_limit(8);
        store.set("a", "1234").unwrap();
        assert!(matches!(
            store.set("a", "12345678"),
            Err(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1234"));
    }

    #[test]
    fn test_overwrite_does_not_double_count() {
        let mut store = MemoryStore::with_limit(6);
        store.set("a", "12345").unwrap();
        store.set("a", "54321").unwrap();
        assert_eq!(store.used(), 6);
    }

    #[test]
    fn test_unavailable() {
        let mut store = MemoryStore::unbounded();
        store.set_unavailable(true);
        assert!(store.get("a").is_err());
        assert!(store.set("a", "1").is_err());
    }
}
