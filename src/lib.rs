//! Aged Cache - A lightweight in-memory key-value cache
//!
//! Every entry carries its own time-to-live. Expired entries are never returned
//! and are purged lazily, on read and on size queries; there is no background
//! sweeper. The clock is injectable so expiry can be driven deterministically.
//!
//! # Example
//! ```
//! use aged_cache::{AgedCache, ManualClock};
//!
//! let clock = ManualClock::default();
//! let cache = AgedCache::with_clock(clock.clone());
//!
//! cache.put("session", 42, 1_000);
//! assert_eq!(cache.get("session"), Some(42));
//!
//! clock.advance_ms(1_001);
//! assert_eq!(cache.get("session"), None);
//! assert!(cache.is_empty());
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{AgedCache, CacheEntry, CacheStats, Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
