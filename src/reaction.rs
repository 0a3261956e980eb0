//! Reaction records
//!
//! A reaction is an externally defined unit of computation that fires at a
//! logical tag. The scheduler owns exactly two pieces of its state: the
//! status word (driven by compare-and-swap transitions) and the heap-position
//! slot maintained by the level queues. The body and everything else belong
//! to the embedding runtime.

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::scheduler::{Scheduler, WorkerId};

/// Sentinel for a reaction that is not currently held by any level queue.
pub(crate) const NOT_IN_QUEUE: usize = usize::MAX;

/// Composite scheduling key: precedence level, then inferred deadline.
///
/// The ordering is lexicographic with the smaller key dominating: a reaction
/// with a lower level always executes first, and within a level an earlier
/// deadline wins. Some runtimes pack both fields into one 64-bit integer;
/// that packing is an optimization, not part of the contract, so the key is
/// kept as an ordinary pair here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReactionIndex {
    level: u32,
    deadline_ns: u64,
}

impl ReactionIndex {
    /// A key with no deadline: the reaction sorts last within its level.
    #[must_use]
    pub const fn new(level: u32) -> Self {
        Self {
            level,
            deadline_ns: u64::MAX,
        }
    }

    /// A key with an explicit deadline relative to the current tag.
    #[must_use]
    pub const fn with_deadline_ns(level: u32, deadline_ns: u64) -> Self {
        Self { level, deadline_ns }
    }

    /// The precedence level.
    #[must_use]
    pub const fn level(self) -> u32 {
        self.level
    }

    /// The deadline in nanoseconds, `u64::MAX` when none was assigned.
    #[must_use]
    pub const fn deadline_ns(self) -> u64 {
        self.deadline_ns
    }
}

/// Execution status of a reaction.
///
/// `trigger` moves `Inactive -> Queued`; `done_with_reaction` moves
/// `Queued -> Inactive`. No other transitions occur. `Running` is reserved
/// by the record for schedulers that track it; this one does not pass
/// through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReactionStatus {
    /// Not queued at the current tag.
    Inactive = 0,
    /// Waiting in a level queue or executing.
    Queued = 1,
    /// Reserved; not transitioned through by this scheduler.
    Running = 2,
}

impl ReactionStatus {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ReactionStatus::Inactive,
            1 => ReactionStatus::Queued,
            _ => ReactionStatus::Running,
        }
    }
}

/// Context handed to a reaction body while it executes.
///
/// Bodies may re-enter the scheduler through [`ReactionContext::scheduler`],
/// typically to trigger a downstream reaction at the current tag. No
/// scheduler lock is held while a body runs.
pub struct ReactionContext<'a> {
    /// The scheduler executing this reaction.
    pub scheduler: &'a Scheduler,
    /// The worker thread the body is running on.
    pub worker: WorkerId,
}

type ReactionBody = Box<dyn Fn(&ReactionContext<'_>) + Send + Sync>;

/// An externally defined reaction.
///
/// Shared as `Arc<Reaction>`; the level queues hold clones of the `Arc`
/// while the reaction is queued, so lifetimes are managed by the embedder.
pub struct Reaction {
    name: String,
    index: ReactionIndex,
    status: AtomicU8,
    heap_pos: AtomicUsize,
    body: ReactionBody,
}

impl Reaction {
    /// Create a reaction at the given precedence level with no deadline.
    pub fn new(
        name: impl Into<String>,
        level: u32,
        body: impl Fn(&ReactionContext<'_>) + Send + Sync + 'static,
    ) -> Arc<Self> {
        Self::build(name.into(), ReactionIndex::new(level), Box::new(body))
    }

    /// Create a reaction with an inferred deadline used to break ties
    /// within its level.
    pub fn with_deadline(
        name: impl Into<String>,
        level: u32,
        deadline: Duration,
        body: impl Fn(&ReactionContext<'_>) + Send + Sync + 'static,
    ) -> Arc<Self> {
        let deadline_ns = u64::try_from(deadline.as_nanos()).unwrap_or(u64::MAX);
        Self::build(
            name.into(),
            ReactionIndex::with_deadline_ns(level, deadline_ns),
            Box::new(body),
        )
    }

    fn build(name: String, index: ReactionIndex, body: ReactionBody) -> Arc<Self> {
        Arc::new(Self {
            name,
            index,
            status: AtomicU8::new(ReactionStatus::Inactive as u8),
            heap_pos: AtomicUsize::new(NOT_IN_QUEUE),
            body,
        })
    }

    /// The reaction's stable name, used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The composite scheduling key.
    #[must_use]
    pub fn index(&self) -> ReactionIndex {
        self.index
    }

    /// The precedence level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.index.level()
    }

    /// The current status word.
    #[must_use]
    pub fn status(&self) -> ReactionStatus {
        ReactionStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    /// Atomically transition `from -> to`. Returns false if the status was
    /// not `from`. This is the choke point that prevents double-enqueue
    /// under concurrent triggers.
    pub(crate) fn transition(&self, from: ReactionStatus, to: ReactionStatus) -> bool {
        self.status
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Run the body. Called by the worker loop with no scheduler lock held.
    pub(crate) fn invoke(&self, ctx: &ReactionContext<'_>) {
        (self.body)(ctx);
    }

    pub(crate) fn heap_pos(&self) -> usize {
        self.heap_pos.load(Ordering::Relaxed)
    }

    pub(crate) fn set_heap_pos(&self, pos: usize) {
        self.heap_pos.store(pos, Ordering::Relaxed);
    }
}

impl fmt::Debug for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reaction")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_orders_level_then_deadline() {
        let a = ReactionIndex::with_deadline_ns(0, 100);
        let b = ReactionIndex::with_deadline_ns(0, 200);
        let c = ReactionIndex::with_deadline_ns(1, 50);

        assert!(a < b, "earlier deadline dominates within a level");
        assert!(b < c, "lower level dominates regardless of deadline");
        assert!(ReactionIndex::new(2) > ReactionIndex::with_deadline_ns(2, 1));
    }

    #[test]
    fn status_transitions() {
        let r = Reaction::new("r", 0, |_| {});
        assert_eq!(r.status(), ReactionStatus::Inactive);

        assert!(r.transition(ReactionStatus::Inactive, ReactionStatus::Queued));
        assert_eq!(r.status(), ReactionStatus::Queued);

        // A second inactive->queued must fail: the reaction is already queued.
        assert!(!r.transition(ReactionStatus::Inactive, ReactionStatus::Queued));

        assert!(r.transition(ReactionStatus::Queued, ReactionStatus::Inactive));
        assert_eq!(r.status(), ReactionStatus::Inactive);
    }

    #[test]
    fn new_reaction_is_not_in_queue() {
        let r = Reaction::new("r", 3, |_| {});
        assert_eq!(r.heap_pos(), NOT_IN_QUEUE);
        assert_eq!(r.level(), 3);
        assert_eq!(r.index().deadline_ns(), u64::MAX);
    }

    #[test]
    fn deadline_constructor() {
        let r = Reaction::with_deadline("r", 1, Duration::from_millis(5), |_| {});
        assert_eq!(r.index().deadline_ns(), 5_000_000);
    }
}
