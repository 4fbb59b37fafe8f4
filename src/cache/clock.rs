//! Clock Module
//!
//! Time sources the cache reads "now" from.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};

// == Clock Trait ==
/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

// == System Clock ==
/// Wall-clock time. The default for every cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// == Manual Clock ==
/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and give the
/// other to the cache.
///
/// # Example
/// ```
/// use aged_cache::{Clock, ManualClock};
///
/// let clock = ManualClock::default();
/// let handle = clock.clone();
/// let start = clock.now();
///
/// handle.advance_ms(250);
/// assert_eq!((clock.now() - start).num_milliseconds(), 250);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    // == Constructor ==
    /// Creates a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock to `instant`, forwards or backwards.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }

    /// Moves the clock by `delta`, saturating at the representable range.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = saturating_add(*now, delta);
    }

    /// Moves the clock by `millis` milliseconds.
    pub fn advance_ms(&self, millis: i64) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = add_millis(*now, millis);
    }
}

impl Default for ManualClock {
    /// Starts at the current wall-clock time.
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// == Instant Arithmetic ==
/// Adds `delta` to `instant`, clamping to `DateTime::MIN_UTC`/`MAX_UTC` on overflow.
pub(crate) fn saturating_add(instant: DateTime<Utc>, delta: TimeDelta) -> DateTime<Utc> {
    instant.checked_add_signed(delta).unwrap_or(if delta < TimeDelta::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// Adds a millisecond offset to `instant` with the same clamping as [`saturating_add`].
pub(crate) fn add_millis(instant: DateTime<Utc>, millis: i64) -> DateTime<Utc> {
    match TimeDelta::try_milliseconds(millis) {
        Some(delta) => saturating_add(instant, delta),
        // Only i64::MIN falls outside TimeDelta's range
        None => DateTime::<Utc>::MIN_UTC,
    }
}
