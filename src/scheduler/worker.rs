//! Worker threads
//!
//! Each worker runs the get / execute / done cycle against the shared
//! scheduler until it is told to stop. No scheduler lock is held while a
//! reaction body executes, and bodies may trigger further reactions
//! re-entrantly through the context they receive.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};
use crate::reaction::ReactionContext;

use super::core::Scheduler;

/// Unique identifier for a worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(pub usize);

impl WorkerId {
    /// Get the numeric ID
    #[must_use]
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed pool of worker threads executing reactions.
///
/// Spawned once after the scheduler is constructed; joined once the
/// program's stop tag has been reached. The pool size is fixed at spawn
/// time and matches the scheduler's configured worker count.
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn one named worker thread per configured worker.
    pub fn spawn(scheduler: &Arc<Scheduler>) -> Result<Self> {
        let mut handles = Vec::with_capacity(scheduler.num_workers());
        for i in 0..scheduler.num_workers() {
            let name = format!("{}-{}", scheduler.thread_name_prefix(), i);
            let scheduler = Arc::clone(scheduler);
            let handle = thread::Builder::new()
                .name(name)
                .spawn(move || worker_loop(&scheduler, WorkerId(i)))
                .map_err(|e| Error::WorkerSpawn {
                    reason: e.to_string(),
                })?;
            handles.push(handle);
        }
        Ok(Self { handles })
    }

    /// Number of workers in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True if the pool holds no workers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to exit.
    ///
    /// Workers exit on their own once the stop tag is reached; a worker
    /// that panicked instead is reported as an error after the rest have
    /// been joined.
    pub fn join(self) -> Result<()> {
        let mut panicked = None;
        for (i, handle) in self.handles.into_iter().enumerate() {
            if handle.join().is_err() {
                panicked.get_or_insert(i);
            }
        }
        match panicked {
            Some(worker) => Err(Error::WorkerPanicked { worker }),
            None => Ok(()),
        }
    }
}

/// The per-thread cycle: ask for a reaction, run its body with no lock
/// held, retire it. A `None` from the scheduler means the stop tag has
/// been reached and the thread returns.
fn worker_loop(scheduler: &Arc<Scheduler>, worker: WorkerId) {
    log::debug!("Worker {} started", worker);
    while let Some(reaction) = scheduler.get_ready_reaction(worker) {
        log::trace!("Worker {} executing reaction {}", worker, reaction.name());
        reaction.invoke(&ReactionContext {
            scheduler: scheduler.as_ref(),
            worker,
        });
        scheduler.done_with_reaction(worker, &reaction);
    }
    log::debug!("Worker {} stopping", worker);
}
