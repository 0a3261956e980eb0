//! Runtime lifecycle
//!
//! Ties the pieces together: build a scheduler around an executive, spawn
//! the worker pool, and run the program to its stop tag. Embedders that need
//! finer control can drive [`crate::scheduler::Scheduler`] and
//! [`crate::scheduler::WorkerPool`] directly; `Runtime` is the one-call
//! entry point.

use std::sync::Arc;

use crate::error::Result;
use crate::executive::Executive;
use crate::scheduler::{Scheduler, SchedulerConfig, SchedulerStats, WorkerPool};

/// A scheduler plus the worker pool lifecycle around it.
pub struct Runtime {
    scheduler: Arc<Scheduler>,
}

impl Runtime {
    /// Create a runtime with the default configuration.
    pub fn new(executive: Box<dyn Executive>) -> Result<Self> {
        Self::with_config(SchedulerConfig::default(), executive)
    }

    /// Create a runtime with a custom configuration.
    pub fn with_config(config: SchedulerConfig, executive: Box<dyn Executive>) -> Result<Self> {
        let scheduler = Scheduler::new(config, executive)?;
        log::info!(
            "Initializing reactor runtime with {} worker(s)",
            scheduler.num_workers()
        );
        Ok(Self { scheduler })
    }

    /// The scheduler this runtime drives.
    ///
    /// Useful for triggering startup reactions before [`Runtime::run`] and
    /// for reading statistics afterwards (clone the `Arc` first).
    #[must_use]
    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    /// Execute the program: spawn the worker pool, let the scheduler run
    /// every tag up to the stop tag, join the workers, and shut down.
    ///
    /// Returns the final statistics snapshot.
    pub fn run(self) -> Result<SchedulerStats> {
        let pool = WorkerPool::spawn(&self.scheduler)?;
        let joined = pool.join();
        self.scheduler.shutdown();
        log::info!("Reactor runtime finished");
        joined?;
        Ok(self.scheduler.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executive::EventQueue;
    use crate::reaction::Reaction;
    use crate::tag::Tag;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn run_executes_scheduled_events_and_stops() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut events = EventQueue::with_stop_tag(Tag::at(2));
        for time in 0..=2 {
            let counter = Arc::clone(&counter);
            let r = Reaction::new(format!("tick@{time}"), 0, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            events.schedule(Tag::at(time), r);
        }

        let config = SchedulerConfig {
            num_workers: 2,
            max_level: 1,
            ..Default::default()
        };
        let runtime = Runtime::with_config(config, Box::new(events)).unwrap();
        let stats = runtime.run().unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(stats.reactions_executed.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn empty_program_terminates() {
        let config = SchedulerConfig {
            num_workers: 1,
            max_level: 0,
            ..Default::default()
        };
        let runtime = Runtime::with_config(config, Box::new(EventQueue::new())).unwrap();
        let stats = runtime.run().unwrap();
        assert_eq!(stats.reactions_executed.load(Ordering::SeqCst), 0);
    }
}
