use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Feed normalization falls back to "now" when an entry carries no usable
/// timestamp or identifier. Routing those reads through a trait keeps the
/// fallback values deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant. Test-only in spirit, but exported so
/// integration tests outside the crate can construct one.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
