//! Platform synchronization primitives
//!
//! The minimal surface the scheduler builds on: mutex and condition variable
//! (provided by `parking_lot`), a counting semaphore, a monotonic clock with
//! bounded sleep, and a timed condition wait keyed to an absolute deadline.
//! Atomics come straight from `std::sync::atomic`; the idle counter and the
//! reaction status word use sequentially consistent ordering.

pub mod clock;
pub mod semaphore;

pub use semaphore::Semaphore;

use parking_lot::{Condvar, MutexGuard};
use std::time::Duration;

/// Outcome of a timed condition wait.
///
/// Timeout is a normal signal, not an error; callers decide what a missed
/// deadline means. Spurious wakeups surface as `Signaled`, so predicates
/// must be re-checked either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult {
    /// The condition variable was signaled (or the wakeup was spurious).
    Signaled,
    /// The absolute deadline passed without a signal.
    TimedOut,
}

/// Wait on `cond` until signaled or until the absolute monotonic deadline
/// (nanoseconds, as reported by [`clock::now_ns`]) passes.
///
/// The mutex behind `guard` is atomically released for the duration of the
/// wait and re-acquired before returning. The deadline is converted to a
/// relative wait against the current clock reading, so a deadline already in
/// the past times out immediately.
pub fn cond_wait_until<T>(
    cond: &Condvar,
    guard: &mut MutexGuard<'_, T>,
    deadline_ns: i64,
) -> WaitResult {
    let now = clock::now_ns();
    if deadline_ns <= now {
        return WaitResult::TimedOut;
    }
    let remaining = Duration::from_nanos((deadline_ns - now) as u64);
    let until = std::time::Instant::now() + remaining;
    if cond.wait_until(guard, until).timed_out() {
        WaitResult::TimedOut
    } else {
        WaitResult::Signaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn timed_wait_expires() {
        let mutex = Mutex::new(());
        let cond = Condvar::new();

        let mut guard = mutex.lock();
        let deadline = clock::now_ns() + 20_000_000; // 20ms
        let result = cond_wait_until(&cond, &mut guard, deadline);
        assert_eq!(result, WaitResult::TimedOut);
        assert!(clock::now_ns() >= deadline);
    }

    #[test]
    fn past_deadline_times_out_immediately() {
        let mutex = Mutex::new(());
        let cond = Condvar::new();

        let mut guard = mutex.lock();
        let before = clock::now_ns();
        let result = cond_wait_until(&cond, &mut guard, before - 1);
        assert_eq!(result, WaitResult::TimedOut);
        // No sleep should have happened for a deadline already behind us.
        assert!(clock::now_ns() - before < 10_000_000);
    }

    #[test]
    fn timed_wait_observes_signal() {
        let shared = Arc::new((Mutex::new(false), Condvar::new()));
        let signaler = Arc::clone(&shared);

        let handle = thread::spawn(move || {
            let (mutex, cond) = &*signaler;
            let mut ready = mutex.lock();
            *ready = true;
            cond.notify_one();
            drop(ready);
        });

        let (mutex, cond) = &*shared;
        let mut ready = mutex.lock();
        let deadline = clock::now_ns() + 5_000_000_000; // generous
        while !*ready {
            if cond_wait_until(cond, &mut ready, deadline) == WaitResult::TimedOut {
                panic!("signal not observed before deadline");
            }
        }
        handle.join().unwrap();
    }
}
