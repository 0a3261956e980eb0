//! Monotonic clock and bounded sleep
//!
//! Physical time is a nondecreasing nanosecond count anchored at a process
//! epoch initialized the first time the clock is read. Logical tags share
//! the same timebase, so a tag's time component can be compared against
//! [`now_ns`] directly.

use once_cell::sync::Lazy;
use std::thread;
use std::time::{Duration, Instant};

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Current physical time in nanoseconds since the process epoch.
///
/// Nondecreasing; the first call establishes the epoch and returns 0.
#[must_use]
pub fn now_ns() -> i64 {
    i64::try_from(EPOCH.elapsed().as_nanos()).unwrap_or(i64::MAX)
}

/// Sleep for at least `ns` nanoseconds.
///
/// Returns at or after the requested duration has elapsed; an early wakeup
/// from the OS is retried against the deadline.
pub fn sleep_for(ns: i64) {
    if ns <= 0 {
        return;
    }
    sleep_until(now_ns().saturating_add(ns));
}

/// Sleep until the absolute monotonic instant `deadline_ns`.
///
/// The underlying OS sleep may return early; this retries until the clock
/// reads at or past the deadline.
pub fn sleep_until(deadline_ns: i64) {
    loop {
        let now = now_ns();
        if now >= deadline_ns {
            return;
        }
        thread::sleep(Duration::from_nanos((deadline_ns - now) as u64));
    }
}
