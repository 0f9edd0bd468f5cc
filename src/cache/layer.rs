//! Cache layer that orchestrates caching logic with network fetching.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::storage::{CacheStorage, MemoryStorage, StoredEntry};
use super::traits::{CacheResult, Clock, SystemClock};

/// TTL for the tag list.
pub const TAGS_TTL: Duration = Duration::from_millis(3_600_000);
/// TTL for the issue list.
pub const ISSUES_TTL: Duration = Duration::from_millis(1_800_000);

/// Time-bound key/value cache with stale-on-error fetching.
///
/// Freshness is checked on read against `read_ttl`, which defaults to
/// [`TAGS_TTL`] whatever TTL an entry was written with. Turn on
/// `with_entry_ttl(true)` to judge each entry by its own write TTL instead.
/// Expired entries are evicted lazily by [`CacheLayer::get`]; there is no
/// background sweeper.
pub struct CacheLayer<S: CacheStorage = MemoryStorage> {
  storage: Arc<S>,
  clock: Arc<dyn Clock>,
  read_ttl: Duration,
  honor_entry_ttl: bool,
}

impl CacheLayer<MemoryStorage> {
  /// Create an empty in-memory cache on the system clock.
  pub fn in_memory() -> Self {
    Self::new(MemoryStorage::new())
  }
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      clock: Arc::new(SystemClock),
      read_ttl: TAGS_TTL,
      honor_entry_ttl: false,
    }
  }

  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  /// Set the TTL every read is checked against.
  pub fn with_read_ttl(mut self, read_ttl: Duration) -> Self {
    self.read_ttl = read_ttl;
    self
  }

  /// Judge freshness by the TTL each entry was written with.
  pub fn with_entry_ttl(mut self, honor_entry_ttl: bool) -> Self {
    self.honor_entry_ttl = honor_entry_ttl;
    self
  }

  fn is_fresh(&self, entry: &StoredEntry, now: i64) -> bool {
    let ttl = if self.honor_entry_ttl {
      entry.ttl_ms
    } else {
      duration_millis(self.read_ttl)
    };
    now.saturating_sub(entry.written_at) < ttl
  }

  /// Get a fresh value, evicting the entry if it has expired.
  pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
    let entry = self.storage.get(key)?;

    if !self.is_fresh(&entry, self.clock.now_millis()) {
      debug!(key, written_at = entry.written_at, "Cache entry expired, removing");
      self.storage.remove_if_written_at(key, entry.written_at);
      return None;
    }

    decode(key, entry.payload)
  }

  /// Store a value under `key`, stamped with the current time.
  pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
    let payload = match serde_json::to_value(value) {
      Ok(payload) => payload,
      Err(e) => {
        warn!(key, error = %e, "Failed to serialize cache entry, skipping write");
        return;
      }
    };

    self.storage.put(
      key,
      StoredEntry {
        payload,
        written_at: self.clock.now_millis(),
        ttl_ms: duration_millis(ttl),
      },
    );
  }

  /// Read an entry of any age without evicting it.
  pub fn peek<T: DeserializeOwned>(&self, key: &str) -> Option<CacheResult<T>> {
    let entry = self.storage.get(key)?;
    let is_stale = !self.is_fresh(&entry, self.clock.now_millis());
    let written_at = entry.written_at;

    decode(key, entry.payload).map(|data| CacheResult::from_cache(data, written_at, is_stale))
  }

  /// Remove an entry, returning whether one existed.
  pub fn invalidate(&self, key: &str) -> bool {
    self.storage.remove(key)
  }

  pub fn clear(&self) {
    self.storage.clear();
  }

  /// Number of stored entries, including expired ones not yet evicted.
  pub fn len(&self) -> usize {
    self.storage.len()
  }

  pub fn is_empty(&self) -> bool {
    self.storage.is_empty()
  }

  /// Fetch with a cache-first strategy.
  ///
  /// 1. If `use_cache` and the entry is fresh, return it without fetching
  /// 2. Otherwise fetch; on success store the data under `key` with `ttl`
  /// 3. On failure return whatever is cached, however old
  /// 4. With nothing cached, return the fetch error
  ///
  /// A stale entry is kept around until a successful fetch replaces it.
  pub async fn fetch<T, E, F, Fut>(
    &self,
    key: &str,
    ttl: Duration,
    use_cache: bool,
    fetcher: F,
  ) -> Result<CacheResult<T>, E>
  where
    T: Serialize + DeserializeOwned,
    E: Display,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
  {
    if use_cache {
      if let Some(cached) = self.peek::<T>(key) {
        if !cached.is_stale() {
          debug!(key, "Cache hit");
          return Ok(cached);
        }
        debug!(key, "Cache entry stale, refreshing");
      }
    }

    match fetcher().await {
      Ok(data) => {
        self.set(key, &data, ttl);
        Ok(CacheResult::from_network(data))
      }
      Err(e) => match self.peek::<T>(key) {
        Some(cached) => {
          warn!(key, error = %e, stale = cached.is_stale(), "Fetch failed, serving cached data");
          Ok(cached)
        }
        None => Err(e),
      },
    }
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      clock: Arc::clone(&self.clock),
      read_ttl: self.read_ttl,
      honor_entry_ttl: self.honor_entry_ttl,
    }
  }
}

fn decode<T: DeserializeOwned>(key: &str, payload: serde_json::Value) -> Option<T> {
  match serde_json::from_value(payload) {
    Ok(value) => Some(value),
    Err(e) => {
      warn!(key, error = %e, "Cached payload has unexpected shape, ignoring");
      None
    }
  }
}

fn duration_millis(d: Duration) -> i64 {
  i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}
