//! Time source for record timestamps.

use chrono::{DateTime, Utc};

/// Supplies `created_at` and `updated_at` values. Handlers take `&dyn Clock`
/// so tests can pin them.
pub trait Clock: Send + Sync {
    /// The current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
