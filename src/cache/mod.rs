//! Cache Module
//!
//! Provides a generic in-memory TTL cache with stale reads and background sweeping.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::{CacheConfig, Lookup, TtlCache};
