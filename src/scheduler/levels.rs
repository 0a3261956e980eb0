//! Level table
//!
//! A fixed sequence of per-level reaction queues, one for every precedence
//! level the program can use. Position `L` holds reactions whose level is
//! `L`. Each queue carries its own mutex: while level `L` is being drained,
//! that mutex is the executing-queue lock the workers and same-level
//! triggers contend on; for every other level the lock is uncontended.

use parking_lot::Mutex;

use super::queue::ReactionQueue;

/// Fixed-size table of `max_level + 1` reaction queues.
#[derive(Debug)]
pub struct LevelTable {
    queues: Box<[Mutex<ReactionQueue>]>,
}

impl LevelTable {
    /// Allocate queues for levels `0..=max_level`.
    #[must_use]
    pub fn new(max_level: usize) -> Self {
        let queues = (0..=max_level)
            .map(|_| Mutex::new(ReactionQueue::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { queues }
    }

    /// The highest level this table holds.
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.queues.len() - 1
    }

    /// The queue for `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level` exceeds [`LevelTable::max_level`]; the caller is
    /// expected to have validated the level against the configuration.
    #[must_use]
    pub fn queue(&self, level: usize) -> &Mutex<ReactionQueue> {
        &self.queues[level]
    }

    /// Number of reactions queued at `level` right now.
    #[must_use]
    pub fn len_at(&self, level: usize) -> usize {
        self.queues[level].lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reaction::Reaction;
    use std::sync::Arc;

    #[test]
    fn table_spans_all_levels() {
        let table = LevelTable::new(3);
        assert_eq!(table.max_level(), 3);
        for level in 0..=3 {
            assert_eq!(table.len_at(level), 0);
        }
    }

    #[test]
    fn queues_are_independent() {
        let table = LevelTable::new(2);
        let r0 = Reaction::new("r0", 0, |_| {});
        let r2 = Reaction::new("r2", 2, |_| {});

        table.queue(0).lock().insert(Arc::clone(&r0));
        table.queue(2).lock().insert(Arc::clone(&r2));

        assert_eq!(table.len_at(0), 1);
        assert_eq!(table.len_at(1), 0);
        assert_eq!(table.len_at(2), 1);

        let popped = table.queue(2).lock().pop().unwrap();
        assert!(Arc::ptr_eq(&popped, &r2));
        assert_eq!(table.len_at(0), 1);
    }

    #[test]
    fn zero_max_level_still_has_level_zero() {
        let table = LevelTable::new(0);
        assert_eq!(table.max_level(), 0);
        assert_eq!(table.len_at(0), 0);
    }
}
