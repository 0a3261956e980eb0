//! Global EDF non-preemptive scheduler core
//!
//! Workers drain one precedence level at a time. A reaction is enqueued with
//! `trigger`, popped with `get_ready_reaction`, and retired with
//! `done_with_reaction`. When every worker has gone idle the last one becomes
//! the coordinator: it either selects the next non-empty level and wakes
//! enough peers to drain it, or, once every level is empty, advances the
//! logical tag under the global lock and starts over. Execution ends when
//! the tag reaches the stop tag.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::executive::Executive;
use crate::platform::Semaphore;
use crate::reaction::{Reaction, ReactionStatus};

use super::levels::LevelTable;
use super::queue::INITIAL_QUEUE_CAPACITY;
use super::worker::WorkerId;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Number of worker threads. Must be at least 1.
    pub num_workers: usize,
    /// Highest precedence level a reaction may carry.
    pub max_level: usize,
    /// Federated execution: notify the executive when a tag completes.
    pub federated: bool,
    /// Thread name prefix for worker threads.
    pub thread_name_prefix: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            max_level: INITIAL_QUEUE_CAPACITY,
            federated: false,
            thread_name_prefix: "reactor-worker".to_string(),
        }
    }
}

/// Scheduler counters and gauges.
///
/// Counters accumulate over the scheduler's lifetime; the two gauges
/// (`idle_workers`, `semaphore_permits`) are sampled when [`Scheduler::stats`]
/// builds a snapshot.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    /// Reactions accepted by `trigger` (the status CAS succeeded).
    pub reactions_triggered: AtomicUsize,
    /// Reactions retired through `done_with_reaction`.
    pub reactions_executed: AtomicUsize,
    /// Tag advances performed by the coordinator.
    pub tags_advanced: AtomicUsize,
    /// Workers currently idle.
    pub idle_workers: AtomicUsize,
    /// Permits currently held by the worker semaphore.
    pub semaphore_permits: AtomicUsize,
}

impl Clone for SchedulerStats {
    fn clone(&self) -> Self {
        SchedulerStats {
            reactions_triggered: AtomicUsize::new(self.reactions_triggered.load(Ordering::SeqCst)),
            reactions_executed: AtomicUsize::new(self.reactions_executed.load(Ordering::SeqCst)),
            tags_advanced: AtomicUsize::new(self.tags_advanced.load(Ordering::SeqCst)),
            idle_workers: AtomicUsize::new(self.idle_workers.load(Ordering::SeqCst)),
            semaphore_permits: AtomicUsize::new(self.semaphore_permits.load(Ordering::SeqCst)),
        }
    }
}

/// State guarded by the global lock: the executive (event queue, current and
/// stop tags) and the completed-a-tag indicator.
struct ExecutiveSlot {
    executive: Box<dyn Executive>,
    tag_completed: bool,
}

/// The GEDF non-preemptive scheduler.
///
/// Create one with [`Scheduler::new`], spawn workers against it (see
/// [`super::worker::WorkerPool`]), and let the coordinator protocol run the
/// program to its stop tag. All methods take `&self`; the scheduler is
/// shared across worker threads as `Arc<Scheduler>`.
pub struct Scheduler {
    config: SchedulerConfig,
    levels: LevelTable,
    /// Level currently being drained by workers.
    executing: AtomicUsize,
    /// One past the drain level; the next level the coordinator scans from.
    next_level: AtomicUsize,
    idle_workers: AtomicUsize,
    stop: AtomicBool,
    shut_down: AtomicBool,
    semaphore: Semaphore,
    executive: Mutex<ExecutiveSlot>,
    stats: SchedulerStats,
}

impl Scheduler {
    /// Create a scheduler managing `config.num_workers` workers, driven by
    /// `executive` for tag advancement.
    ///
    /// The semaphore starts with zero permits, every level queue is
    /// allocated up front, and level 0 is the executing queue at rest.
    pub fn new(config: SchedulerConfig, executive: Box<dyn Executive>) -> Result<Arc<Self>> {
        if config.num_workers == 0 {
            return Err(Error::InvalidConfig {
                reason: "num_workers must be at least 1".to_string(),
            });
        }
        log::debug!(
            "Scheduler: initializing with {} workers and max level {}",
            config.num_workers,
            config.max_level
        );

        let levels = LevelTable::new(config.max_level);
        Ok(Arc::new(Self {
            config,
            levels,
            executing: AtomicUsize::new(0),
            next_level: AtomicUsize::new(0),
            idle_workers: AtomicUsize::new(0),
            stop: AtomicBool::new(false),
            shut_down: AtomicBool::new(false),
            semaphore: Semaphore::new(0),
            executive: Mutex::new(ExecutiveSlot {
                executive,
                tag_completed: false,
            }),
            stats: SchedulerStats::default(),
        }))
    }

    /// Number of workers this scheduler manages.
    #[must_use]
    pub fn num_workers(&self) -> usize {
        self.config.num_workers
    }

    /// Highest level a reaction may carry.
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.config.max_level
    }

    pub(crate) fn thread_name_prefix(&self) -> &str {
        &self.config.thread_name_prefix
    }

    /// Snapshot of the scheduler's counters and gauges.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        let snapshot = self.stats.clone();
        snapshot
            .idle_workers
            .store(self.idle_workers.load(Ordering::SeqCst), Ordering::SeqCst);
        snapshot
            .semaphore_permits
            .store(self.semaphore.permits(), Ordering::SeqCst);
        snapshot
    }

    /// Mark the scheduler shut down. Idempotent; the level queues and the
    /// semaphore are released when the scheduler is dropped.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        log::debug!(
            "Scheduler: shut down with {} semaphore permit(s) outstanding",
            self.semaphore.permits()
        );
    }

    /// Trigger `reaction` at the current tag.
    ///
    /// The `Inactive -> Queued` transition guards against double enqueue: a
    /// reaction already queued at this tag is left alone. `worker` is the
    /// calling worker, or `None` for anonymous callers. No wakeup is issued;
    /// workers observe the reaction on the next drain of its level.
    ///
    /// # Panics
    ///
    /// Panics if the reaction's level exceeds the configured maximum; that
    /// is a configuration error, not a runtime condition.
    pub fn trigger(&self, reaction: &Arc<Reaction>, worker: Option<WorkerId>) {
        if !reaction.transition(ReactionStatus::Inactive, ReactionStatus::Queued) {
            return;
        }
        self.stats.reactions_triggered.fetch_add(1, Ordering::SeqCst);
        log::debug!(
            "Scheduler: enqueueing reaction {} at level {} (caller: {:?})",
            reaction.name(),
            reaction.level(),
            worker
        );
        self.insert_reaction(reaction);
    }

    /// Ask for one more reaction to execute.
    ///
    /// Blocks until a reaction at the executing level is available and
    /// returns it, or returns `None` once the stop tag has been reached and
    /// the worker should exit.
    pub fn get_ready_reaction(&self, worker: WorkerId) -> Option<Arc<Reaction>> {
        while !self.stop.load(Ordering::SeqCst) {
            let level = self.executing.load(Ordering::SeqCst);
            let popped = self.levels.queue(level).lock().pop();
            if let Some(reaction) = popped {
                return Some(reaction);
            }

            log::trace!("Scheduler: worker {} is out of ready reactions", worker);
            self.wait_for_work(worker);
        }
        None
    }

    /// Retire a reaction the worker has finished executing.
    ///
    /// # Panics
    ///
    /// Panics if the reaction is not in the `Queued` status: that means a
    /// trigger/done pairing has been violated somewhere, which is fatal.
    pub fn done_with_reaction(&self, worker: WorkerId, reaction: &Arc<Reaction>) {
        if !reaction.transition(ReactionStatus::Queued, ReactionStatus::Inactive) {
            panic!(
                "reaction {} retired by worker {} with unexpected status {:?} (expected Queued)",
                reaction.name(),
                worker,
                reaction.status()
            );
        }
        self.stats.reactions_executed.fetch_add(1, Ordering::SeqCst);
    }

    /// Insert into the level table. The target queue's own mutex makes the
    /// federated case (inserting at the level currently being drained) safe
    /// against concurrent pops.
    fn insert_reaction(&self, reaction: &Arc<Reaction>) {
        let level = reaction.level() as usize;
        assert!(
            level <= self.levels.max_level(),
            "reaction {} has level {} but the scheduler allows at most {}",
            reaction.name(),
            level,
            self.levels.max_level()
        );
        self.levels.queue(level).lock().insert(Arc::clone(reaction));
    }

    /// Park until the scheduler hands out work.
    ///
    /// The last worker to go idle becomes the coordinator and distributes
    /// work (or advances the tag) itself; everyone else blocks on the
    /// semaphore.
    fn wait_for_work(&self, worker: WorkerId) {
        if self.idle_workers.fetch_add(1, Ordering::SeqCst) == self.config.num_workers - 1 {
            log::debug!("Scheduler: worker {} is the last to go idle", worker);
            self.advance_or_distribute();
        } else {
            log::trace!("Scheduler: worker {} acquiring the semaphore", worker);
            self.semaphore.acquire();
            log::trace!("Scheduler: worker {} woke up", worker);
        }
    }

    /// Coordinator loop: select the next non-empty level and wake workers,
    /// advancing the tag whenever the level scan wraps around.
    ///
    /// Runs only while every other worker is parked, which is what makes
    /// reading and resetting `next_level` and `executing` here safe.
    fn advance_or_distribute(&self) {
        loop {
            if self.next_level.load(Ordering::SeqCst) > self.levels.max_level() {
                self.next_level.store(0, Ordering::SeqCst);
                log::debug!("Scheduler: nothing left at this tag; advancing");
                let should_stop = {
                    let mut slot = self.executive.lock();
                    self.advance_tag_locked(&mut slot)
                };
                if should_stop {
                    log::debug!("Scheduler: reached the stop tag");
                    self.signal_stop();
                    return;
                }
            }

            let ready = self.distribute_ready();
            if ready > 0 {
                self.notify_workers(ready);
                return;
            }
        }
    }

    /// Find the first non-empty level at or above `next_level`, make it the
    /// executing level, and return how many reactions it holds. Returns 0
    /// and parks `next_level` past the maximum when every level is empty.
    fn distribute_ready(&self) -> usize {
        let mut level = self.next_level.load(Ordering::SeqCst);
        while level <= self.levels.max_level() {
            let ready = self.levels.len_at(level);
            if ready > 0 {
                self.executing.store(level, Ordering::SeqCst);
                self.next_level.store(level + 1, Ordering::SeqCst);
                log::debug!(
                    "Scheduler: distributing {} reaction(s) at level {}",
                    ready,
                    level
                );
                return ready;
            }
            level += 1;
        }
        self.next_level.store(level, Ordering::SeqCst);
        0
    }

    /// Wake enough idle workers to drain the executing level. The
    /// coordinator counts as the first woken worker, so one fewer permit is
    /// released than workers are marked busy.
    fn notify_workers(&self, ready: usize) {
        let idle = self.idle_workers.load(Ordering::SeqCst);
        let workers_to_wake = idle.min(ready);
        log::debug!("Scheduler: notifying {} worker(s)", workers_to_wake);
        self.idle_workers.fetch_sub(workers_to_wake, Ordering::SeqCst);
        if workers_to_wake > 1 {
            self.semaphore.release(workers_to_wake - 1);
        }
    }

    /// Advance the tag under the global lock. Returns true when execution
    /// must stop instead of advancing.
    ///
    /// On entry after a completed tag, the executive is notified (federated
    /// mode) and the stop tag is checked first, so reactions at the stop tag
    /// run but nothing beyond it does. `next_tag` may block waiting for
    /// physical time; it repopulates the level table through
    /// [`Scheduler::trigger`], which never takes this lock.
    fn advance_tag_locked(&self, slot: &mut ExecutiveSlot) -> bool {
        if slot.tag_completed {
            let tag = slot.executive.current_tag();
            if self.config.federated {
                slot.executive.tag_complete(tag);
            }
            if tag >= slot.executive.stop_tag() {
                return true;
            }
        }
        slot.tag_completed = true;
        self.stats.tags_advanced.fetch_add(1, Ordering::SeqCst);
        slot.executive.next_tag(self);
        false
    }

    /// Tell every worker it is time to stop and flood the semaphore so the
    /// parked ones observe it.
    fn signal_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.semaphore.release(self.config.num_workers - 1);
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("num_workers", &self.config.num_workers)
            .field("max_level", &self.config.max_level)
            .field("federated", &self.config.federated)
            .field("idle_workers", &self.idle_workers.load(Ordering::SeqCst))
            .field("stop", &self.stop.load(Ordering::SeqCst))
            .finish()
    }
}
