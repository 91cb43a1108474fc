//! Wall-clock and monotonic time helpers.
//!
//! Lifecycle timestamps and durations use the tokio monotonic clock so that
//! tests can run with a paused runtime. Wall-clock milliseconds are only used
//! to stamp audit events.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub use tokio::time::Instant;

/// Milliseconds since the Unix epoch, or 0 if the system clock is before it.
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Current monotonic instant (honours a paused tokio clock).
pub fn monotonic_now() -> Instant {
    Instant::now()
}

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
pub fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Roughly thirty years; the cap for deadlines that would overflow `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + delay`, saturating to a far-future instant instead of overflowing.
pub fn deadline_after(now: Instant, delay: Duration) -> Instant {
    now.checked_add(delay)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}
