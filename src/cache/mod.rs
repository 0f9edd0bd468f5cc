//! In-memory time-bound cache with stale-on-error fallback.
//!
//! - Entries carry their write timestamp and the TTL they were written with
//! - Reads are freshness-gated and evict expired entries lazily
//! - Fetches fall back to cached data of any age when the network fails

mod layer;
mod storage;
mod traits;

pub use layer::{CacheLayer, ISSUES_TTL, TAGS_TTL};
pub use storage::{CacheStorage, MemoryStorage, StoredEntry};
pub use traits::{CacheResult, CacheSource, Clock, ManualClock, SystemClock};
