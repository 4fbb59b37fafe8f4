//! Cache Store Module
//!
//! Main cache engine combining concurrent map storage with lazy TTL expiration.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use dashmap::DashMap;
use tracing::{debug, info, trace};

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};
use crate::cache::stats::StatsRecorder;
use crate::config::CacheConfig;
use crate::error::Result;

// == Aged Cache ==
/// Concurrent key-value cache where every entry carries its own TTL.
///
/// Expired entries are never returned. They are dropped lazily: a read that
/// finds one removes it, and `size`/`is_empty` sweep the whole map first.
/// All operations take `&self`; share the cache across threads with `Arc`.
pub struct AgedCache<K, V, C = SystemClock>
where
    K: Eq + Hash,
{
    /// Key-value storage
    entries: DashMap<K, CacheEntry<V>>,
    /// Source of "now" for every expiry decision
    clock: C,
    /// Read and expiry counters
    stats: StatsRecorder,
}

impl<K, V> AgedCache<K, V, SystemClock>
where
    K: Eq + Hash,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty cache on the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K, V> Default for AgedCache<K, V, SystemClock>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> AgedCache<K, V, C>
where
    K: Eq + Hash,
    V: Clone,
    C: Clock,
{
    /// Creates an empty cache reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            stats: StatsRecorder::default(),
        }
    }

    /// Creates an empty cache with a tuned backing map.
    ///
    /// Fails with `CacheError::InvalidConfig` if the configuration is rejected.
    pub fn with_config(config: CacheConfig, clock: C) -> Result<Self> {
        config.validate()?;

        let entries = match config.shard_amount {
            Some(shards) => DashMap::with_capacity_and_shard_amount(config.initial_capacity, shards),
            None => DashMap::with_capacity(config.initial_capacity),
        };
        info!(
            "Aged cache initialized: initial_capacity={}, shard_amount={:?}",
            config.initial_capacity, config.shard_amount
        );

        Ok(Self {
            entries,
            clock,
            stats: StatsRecorder::default(),
        })
    }

    // == Put ==
    /// Stores `value` under `key` for `retention_ms` milliseconds from now.
    ///
    /// An existing entry for `key` is replaced together with its expiry.
    /// Zero or negative retention stores an entry that is about to expire or
    /// already has.
    pub fn put(&self, key: K, value: V, retention_ms: i64) {
        let entry = CacheEntry::new(value, self.clock.now(), retention_ms);
        trace!(retention_ms, expires_at = %entry.expires_at, "storing entry");
        self.entries.insert(key, entry);
    }

    // == Get ==
    /// Retrieves a clone of the value for `key` if it is still live.
    ///
    /// An expired entry is removed as a side effect and reported as `None`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();

        // The shard read guard must be gone before remove_if takes the write lock
        let lookup = self.entries.get(key).map(|entry| {
            if entry.is_expired_at(now) {
                None
            } else {
                Some(entry.value.clone())
            }
        });

        match lookup {
            Some(Some(value)) => {
                self.stats.record_hit();
                Some(value)
            }
            Some(None) => {
                // A put racing in since the lookup leaves a live entry behind
                if self
                    .entries
                    .remove_if(key, |_, entry| entry.is_expired_at(now))
                    .is_some()
                {
                    self.stats.record_expirations(1);
                    trace!("evicted expired entry on read");
                }
                self.stats.record_miss();
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Remove ==
    /// Removes the entry for `key`, returning its value if it was still live.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let (_, entry) = self.entries.remove(key)?;

        if entry.is_expired_at(now) {
            self.stats.record_expirations(1);
            None
        } else {
            Some(entry.value)
        }
    }

    // == Time To Live ==
    /// Returns how many milliseconds `key` has left, or None if absent or expired.
    ///
    /// Does not evict.
    pub fn time_to_live_ms<Q>(&self, key: &Q) -> Option<i64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        self.entries
            .get(key)
            .and_then(|entry| entry.ttl_remaining_ms(now))
    }

    // == Is Empty ==
    /// Returns true if no live entries remain.
    pub fn is_empty(&self) -> bool {
        self.purge_expired();
        self.entries.is_empty()
    }

    // == Size ==
    /// Returns the number of live entries.
    pub fn size(&self) -> usize {
        self.purge_expired();
        self.entries.len()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Shards are locked one at a time, so concurrent operations keep running.
    /// Entries inserted mid-scan may or may not be visited.
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0usize;

        self.entries.retain(|_, entry| {
            let live = !entry.is_expired_at(now);
            if !live {
                removed += 1;
            }
            live
        });

        self.stats.record_expirations(removed as u64);
        if removed > 0 {
            debug!("TTL cleanup: removed {} expired entries", removed);
        }
        removed
    }

    // == Clear ==
    /// Drops every entry, live or not.
    pub fn clear(&self) {
        self.entries.clear();
    }

    // == Stats ==
    /// Returns current counters.
    ///
    /// `total_entries` is the raw map length and may include entries that
    /// have expired but not yet been swept.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }
}

impl<K, V, C> fmt::Debug for AgedCache<K, V, C>
where
    K: Eq + Hash,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgedCache")
            .field("entries", &self.entries.len())
            .field("clock", &self.clock)
            .finish()
    }
}
