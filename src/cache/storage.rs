//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// A serialized cache entry.
#[derive(Debug, Clone)]
pub struct StoredEntry {
  /// JSON-encoded value
  pub json: String,
  /// When the value was stored
  pub cached_at: DateTime<Utc>,
}

impl StoredEntry {
  pub fn now(json: String) -> Self {
    Self {
      json,
      cached_at: Utc::now(),
    }
  }
}

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  fn get(&self, key: &str) -> Option<StoredEntry>;

  fn put(&self, key: &str, entry: StoredEntry);

  fn remove(&self, key: &str);
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _key: &str) -> Option<StoredEntry> {
    None // Always miss
  }

  fn put(&self, _key: &str, _entry: StoredEntry) {}

  fn remove(&self, _key: &str) {}
}

/// Process-local storage; lives as long as the app.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn entries(&self) -> MutexGuard<'_, HashMap<String, StoredEntry>> {
    // A panic while holding the lock leaves plain data behind; keep serving it
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &str) -> Option<StoredEntry> {
    self.entries().get(key).cloned()
  }

  fn put(&self, key: &str, entry: StoredEntry) {
    self.entries().insert(key.to_string(), entry);
  }

  fn remove(&self, key: &str) {
    self.entries().remove(key);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_memory_storage_roundtrip() {
    let storage = MemoryStorage::new();
    assert!(storage.get("a").is_none());

    storage.put("a", StoredEntry::now("[1,2]".into()));
    assert_eq!(storage.get("a").map(|e| e.json), Some("[1,2]".to_string()));

    storage.remove("a");
    assert!(storage.get("a").is_none());
  }

  #[test]
  fn test_noop_storage_always_misses() {
    let storage = NoopStorage;
    storage.put("a", StoredEntry::now("1".into()));
    assert!(storage.get("a").is_none());
  }
}
