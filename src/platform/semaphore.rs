//! Counting semaphore
//!
//! Parks idle worker threads. Built from a `parking_lot` mutex and condition
//! variable; permits may be released in bulk, waking up to that many waiters
//! at once.

use parking_lot::{Condvar, Mutex};

/// A counting semaphore with a nonnegative permit count.
#[derive(Debug)]
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    /// Create a semaphore holding `count` permits.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            permits: Mutex::new(count),
            available: Condvar::new(),
        }
    }

    /// Take one permit, blocking until one is available.
    pub fn acquire(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }
        *permits -= 1;
    }

    /// Add `n` permits, waking up to `n` waiters. Releasing zero permits is
    /// a no-op.
    pub fn release(&self, n: usize) {
        if n == 0 {
            return;
        }
        let mut permits = self.permits.lock();
        *permits += n;
        if n == 1 {
            self.available.notify_one();
        } else {
            self.available.notify_all();
        }
    }

    /// The number of permits currently available.
    #[must_use]
    pub fn permits(&self) -> usize {
        *self.permits.lock()
    }
}
