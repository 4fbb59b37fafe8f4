//! Configuration Module
//!
//! Construction-time tuning for the backing concurrent map.

use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// None of these change what the cache returns, only how the map is laid out.
///
/// # Example
/// ```
/// use aged_cache::CacheConfig;
///
/// let config = CacheConfig::new()
///     .with_initial_capacity(1024)
///     .with_shard_amount(16);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Number of entries to preallocate room for
    pub initial_capacity: usize,
    /// Number of independently locked shards, None = dashmap's default
    pub shard_amount: Option<usize>,
}

impl CacheConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of entries to preallocate.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the shard count. Must be a power of two greater than one.
    pub fn with_shard_amount(mut self, shards: usize) -> Self {
        self.shard_amount = Some(shards);
        self
    }

    /// Checks the configuration before it reaches the map constructor.
    ///
    /// dashmap asserts on a bad shard count, so it is rejected here as an error instead.
    pub fn validate(&self) -> Result<()> {
        if let Some(shards) = self.shard_amount {
            if shards <= 1 || !shards.is_power_of_two() {
                return Err(CacheError::InvalidConfig(format!(
                    "shard_amount must be a power of two greater than 1, got {}",
                    shards
                )));
            }
        }
        Ok(())
    }
}
