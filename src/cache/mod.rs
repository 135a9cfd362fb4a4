//! Response cache
//!
//! This module provides time-limited memoization of upstream responses and
//! favorites queries. Entries live in an injected `CacheStore`; expiry is
//! judged against an injected `Clock`. Payloads are kept as opaque JSON so a
//! single store can hold every kind of response.

mod clock;
mod file;
pub mod key;
mod memory;

pub use clock::{Clock, SystemClock};
pub use file::FileStore;
pub use memory::MemoryStore;

#[cfg(test)]
pub(crate) use clock::ManualClock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to determine cache directory location
    #[error("Failed to determine cache directory location")]
    CacheDirectoryNotFound,

    /// Failed to create or access cache directory
    #[error("Failed to create cache directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read cached data
    #[error("Failed to read cache file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write cached data
    #[error("Failed to write cache file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to remove cached data
    #[error("Failed to remove cache file {path}: {source}")]
    DeleteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to deserialize cached data
    #[error("Failed to deserialize cache file {path}: {source}")]
    DeserializationFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to serialize data for caching
    #[error("Failed to serialize data: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A single cached payload together with its expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The key the entry is stored under
    pub key: String,
    /// The cached payload
    pub value: serde_json::Value,
    /// Instant after which the entry must no longer be served
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Whether the entry may still be served at `now`
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

/// Key-value storage backing the response cache
///
/// Stores are shared between all callers. Writes are last-write-wins; there
/// is no versioning. Stores do not judge expiry themselves.
pub trait CacheStore: Send + Sync {
    /// Loads the entry stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Stores an entry, replacing any previous entry under the same key
    fn set(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// Removes the entry stored under `key`; missing keys are not an error
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Removes every entry
    fn flush(&self) -> Result<(), CacheError>;
}

/// Memoizes computed values in a `CacheStore` with per-call TTLs
///
/// Cloning is cheap; clones share the same store and clock.
///
/// There is no mutual exclusion between concurrent callers: two misses on
/// the same key both compute, and the later write wins.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    /// Creates a response cache over `store` using the system clock
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Creates a response cache over `store` using the given clock
    pub fn with_clock(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Returns the live value under `key`, computing and storing it on a miss
    ///
    /// `compute` is not invoked when a live entry exists. Otherwise it runs
    /// exactly once and its result is stored for `ttl` before being returned.
    ///
    /// # Arguments
    ///
    /// * `key` - Cache key, usually built with the functions in [`key`]
    /// * `ttl` - How long a freshly computed value stays live
    /// * `compute` - Producer for the value on a miss
    ///
    /// # Returns
    ///
    /// The cached value if one is live, otherwise the freshly computed one
    pub fn get_or_compute<T, F>(&self, key: &str, ttl: Duration, compute: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.lookup(key) {
            return value;
        }

        let value = compute();
        self.set_with_ttl(key, &value, ttl);
        value
    }

    /// Like `get_or_compute`, but only successful results are stored
    ///
    /// An `Err` from `compute` is handed back to the caller and leaves the
    /// cache untouched, so the next call retries.
    pub fn get_or_try_compute<T, E, F>(&self, key: &str, ttl: Duration, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.lookup(key) {
            return Ok(value);
        }

        let value = compute()?;
        self.set_with_ttl(key, &value, ttl);
        Ok(value)
    }

    /// Stores `value` under `key` for `ttl`
    ///
    /// Failures are logged and otherwise ignored; a value that could not be
    /// cached is still valid for the caller.
    pub fn set_with_ttl<T>(&self, key: &str, value: &T, ttl: Duration)
    where
        T: Serialize,
    {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize value for cache");
                return;
            }
        };

        let expires_at = match chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
        {
            Some(expires_at) => expires_at,
            None => {
                warn!(key, ttl_secs = ttl.as_secs(), "cache ttl out of range, not storing");
                return;
            }
        };

        let entry = CacheEntry {
            key: key.to_string(),
            value,
            expires_at,
        };

        if let Err(e) = self.store.set(entry) {
            warn!(key, error = %e, "failed to write cache entry");
        }
    }

    /// Removes `key` immediately, regardless of its remaining TTL
    pub fn invalidate(&self, key: &str) {
        debug!(key, "invalidating cache entry");
        if let Err(e) = self.store.delete(key) {
            warn!(key, error = %e, "failed to invalidate cache entry");
        }
    }

    /// Removes every entry in the underlying store
    pub fn flush(&self) -> Result<(), CacheError> {
        self.store.flush()
    }

    /// Reads a live value, treating every kind of failure as a miss
    fn lookup<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let entry = match self.store.get(key) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!(key, "cache miss");
                return None;
            }
            Err(e) => {
                // A broken store must not prevent the caller from getting data
                warn!(key, error = %e, "cache read failed, recomputing");
                return None;
            }
        };

        if !entry.is_live(self.clock.now()) {
            debug!(key, expires_at = %entry.expires_at, "cache entry expired");
            if let Err(e) = self.store.delete(key) {
                warn!(key, error = %e, "failed to drop expired cache entry");
            }
            return None;
        }

        match serde_json::from_value(entry.value) {
            Ok(value) => {
                debug!(key, "cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "cached payload has unexpected shape, recomputing");
                None
            }
        }
    }
}
