use crate::config::DEFAULT_TTL_UNIT_MS;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared cell holding the length of one expiry unit in milliseconds.
///
/// Clones share the same value. Writes are last-write-wins: any decorator
/// configured with a unit override rewrites it for every holder of the cell.
///
/// # Examples
///
/// ```
/// use tincache::store::ExpiryUnit;
///
/// let unit = ExpiryUnit::new();
/// let shared = unit.clone();
/// unit.set(1000);
/// assert_eq!(shared.get(), 1000);
/// ```
#[derive(Debug, Clone)]
pub struct ExpiryUnit {
    ms: Arc<AtomicU64>,
}

impl ExpiryUnit {
    /// Create an isolated cell starting at one minute per unit.
    pub fn new() -> Self {
        Self {
            ms: Arc::new(AtomicU64::new(DEFAULT_TTL_UNIT_MS)),
        }
    }

    /// The process-wide cell used by stores that are not given their own.
    pub fn global() -> Self {
        static UNIT: OnceLock<ExpiryUnit> = OnceLock::new();
        UNIT.get_or_init(ExpiryUnit::new).clone()
    }

    /// Milliseconds per unit.
    pub fn get(&self) -> u64 {
        self.ms.load(Ordering::SeqCst)
    }

    /// Replace the unit. Zero is ignored.
    pub fn set(&self, ms: u64) {
        if ms > 0 {
            self.ms.store(ms, Ordering::SeqCst);
        }
    }

    /// Whole units elapsed at `now_ms`.
    pub fn units_at(&self, now_ms: u64) -> u64 {
        now_ms / self.get()
    }
}

impl Default for ExpiryUnit {
    fn default() -> Self {
        Self::new()
    }
}

/// Source of wall-clock time for expiration checks.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_one_minute() {
        assert_eq!(ExpiryUnit::new().get(), 60_000);
    }

    #[test]
    fn zero_is_ignored() {
        let unit = ExpiryUnit::new();
        unit.set(0);
        assert_eq!(unit.get(), 60_000);
    }

    #[test]
    fn units_floor() {
        let unit = ExpiryUnit::new();
        unit.set(1000);
        assert_eq!(unit.units_at(2999), 2);
        assert_eq!(unit.units_at(3000), 3);
    }

    #[test]
    fn manual_clock_is_shared() {
        let clock = ManualClock::new(5);
        let other = clock.clone();
        clock.advance(10);
        assert_eq!(other.now_ms(), 15);
    }

    #[test]
    fn system_clock_is_after_epoch() {
        assert!(SystemClock.now_ms() > 0);
    }
}
