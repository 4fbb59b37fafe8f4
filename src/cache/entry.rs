//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use chrono::{DateTime, Utc};

use crate::cache::clock::add_millis;

// == Cache Entry ==
/// A stored value together with the instant it stops being readable.
///
/// Entries are never mutated. Overwriting a key replaces the whole entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Last instant at which the entry is still live
    pub expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry that stays live for `retention_ms` after `now`.
    ///
    /// Negative retention yields an entry that is already expired.
    pub fn new(value: V, now: DateTime<Utc>, retention_ms: i64) -> Self {
        Self {
            value,
            expires_at: add_millis(now, retention_ms),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired as of `now`.
    ///
    /// Boundary condition: expiry is strict. At exactly `expires_at` the entry
    /// is still live, one instant later it is gone.
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, or None once expired.
    pub fn ttl_remaining_ms(&self, now: DateTime<Utc>) -> Option<i64> {
        if self.is_expired_at(now) {
            None
        } else {
            Some((self.expires_at - now).num_milliseconds())
        }
    }
}
