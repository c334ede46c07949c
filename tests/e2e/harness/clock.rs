use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Controllable time for deterministic commit timestamps.
///
/// Pass [`MockClock::as_provider`] to `Repository::with_time_provider()`.
#[derive(Clone)]
pub struct MockClock {
    current: Arc<AtomicI64>,
}

/// 2023-11-14T22:13:20Z
const DEFAULT_START: i64 = 1_700_000_000;

impl MockClock {
    /// Creates a time provider function suitable for passing to Repository.
    pub fn as_provider(&self) -> impl Fn() -> i64 + Send + Sync + 'static {
        let current = self.current.clone();
        move || current.load(Ordering::SeqCst)
    }
}

impl MockClock {
    /// Create a new mock clock at a fixed instant
    pub fn new() -> Self {
        Self::starting_at(DEFAULT_START)
    }

    /// Create a mock clock at `unix_secs`
    pub fn starting_at(unix_secs: i64) -> Self {
        Self {
            current: Arc::new(AtomicI64::new(unix_secs)),
        }
    }

    /// Get current timestamp
    pub fn now(&self) -> i64 {
        self.current.load(Ordering::SeqCst)
    }

    /// Advance time by duration
    pub fn advance(&self, duration: Duration) {
        let seconds = duration.as_secs() as i64;
        self.current.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Advance time by hours
    pub fn advance_hours(&self, hours: u64) {
        self.advance(Duration::from_secs(hours * 3600));
    }

    /// Advance time by days
    pub fn advance_days(&self, days: u64) {
        self.advance(Duration::from_secs(days * 86400));
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}
