//! Per-key state for incrementally loaded lists.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::paging::{LoadTrigger, PageCollection};

/// Everything the cache keeps for one infinite query key.
#[derive(Debug)]
pub struct InfiniteEntry<T> {
  pub pages: PageCollection<T>,
  pub trigger: LoadTrigger,
  /// Bumped on reset; results started under an older generation are dropped
  pub generation: u64,
}

impl<T> Default for InfiniteEntry<T> {
  fn default() -> Self {
    Self {
      pages: PageCollection::new(),
      trigger: LoadTrigger::new(),
      generation: 0,
    }
  }
}

/// Shared registry of infinite query entries, keyed by query hash.
///
/// The lock is only ever held for the duration of a synchronous closure,
/// never across an await.
pub struct PageStore<T> {
  entries: Arc<Mutex<HashMap<String, InfiniteEntry<T>>>>,
}

impl<T> Clone for PageStore<T> {
  fn clone(&self) -> Self {
    Self {
      entries: Arc::clone(&self.entries),
    }
  }
}

impl<T> Default for PageStore<T> {
  fn default() -> Self {
    Self {
      entries: Arc::new(Mutex::new(HashMap::new())),
    }
  }
}

impl<T> PageStore<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Run `f` against the entry for `key`, creating it on first use.
  pub fn with_entry<R>(&self, key: &str, f: impl FnOnce(&mut InfiniteEntry<T>) -> R) -> R {
    let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
    let entry = entries.entry(key.to_string()).or_default();
    f(entry)
  }

  /// Drop all pages and load state for `key`.
  pub fn reset(&self, key: &str) {
    self.with_entry(key, |entry| {
      let generation = entry.generation + 1;
      *entry = InfiniteEntry {
        generation,
        ..InfiniteEntry::default()
      };
    });
  }
}
