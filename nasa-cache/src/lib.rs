//! TTL cache for NASA feed results.
//!
//! A fixed six-slot table, one slot per source, with per-source expiry.

mod cache;

pub use cache::{CacheEntry, CacheStats, SourceCache, SourceCacheStats};
