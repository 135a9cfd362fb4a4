//! In-process cache store

use super::{CacheEntry, CacheError, CacheStore};
use dashmap::DashMap;

/// A cache store kept entirely in memory
///
/// Safe to share between threads; entries vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, live or expired
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, entry: CacheEntry) -> Result<(), CacheError> {
        self.entries.insert(entry.key.clone(), entry);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    fn flush(&self) -> Result<(), CacheError> {
        self.entries.clear();
        Ok(())
    }
}
