//! Cache Module
//!
//! Provides in-memory caching with per-entry TTL and lazy expiration.

mod clock;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::AgedCache;
