//! Cache storage trait and in-memory implementation.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// A single stored entry: serialized payload plus write metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
  /// Serialized payload
  pub payload: Value,
  /// Write time in milliseconds since the epoch
  pub written_at: i64,
  /// TTL the writer asked for, in milliseconds
  pub ttl_ms: i64,
}

/// Trait for cache storage backends.
///
/// Implementations must be safe to share between tasks; every method is a
/// single atomic step with respect to other calls.
pub trait CacheStorage: Send + Sync {
  /// Get a copy of the entry stored under `key`.
  fn get(&self, key: &str) -> Option<StoredEntry>;

  /// Store an entry, replacing any previous one.
  fn put(&self, key: &str, entry: StoredEntry);

  /// Remove the entry under `key`, returning whether one existed.
  fn remove(&self, key: &str) -> bool;

  /// Remove the entry only if it is still the one written at `written_at`.
  ///
  /// Lazy eviction uses this so an expired read can't delete a newer write
  /// that landed between the read and the removal.
  fn remove_if_written_at(&self, key: &str, written_at: i64) -> bool;

  /// Drop every entry.
  fn clear(&self);

  /// Number of stored entries, fresh or not.
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Process-local storage behind a mutex. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn entries(&self) -> MutexGuard<'_, HashMap<String, StoredEntry>> {
    // A panic while holding the lock can't leave the map half-written.
    self
      .entries
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &str) -> Option<StoredEntry> {
    self.entries().get(key).cloned()
  }

  fn put(&self, key: &str, entry: StoredEntry) {
    self.entries().insert(key.to_string(), entry);
  }

  fn remove(&self, key: &str) -> bool {
    self.entries().remove(key).is_some()
  }

  fn remove_if_written_at(&self, key: &str, written_at: i64) -> bool {
    let mut entries = self.entries();
    match entries.get(key) {
      Some(entry) if entry.written_at == written_at => {
        entries.remove(key);
        true
      }
      _ => false,
    }
  }

  fn clear(&self) {
    self.entries().clear();
  }

  fn len(&self) -> usize {
    self.entries().len()
  }
}
