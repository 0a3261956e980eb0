//! Tag-advance seam and the reference event queue
//!
//! The scheduler does not own logical time. When every worker has gone idle
//! and every level queue is empty, the coordinating worker asks an
//! [`Executive`] to advance the tag and repopulate the level table. The
//! executive lives behind the scheduler's global lock, so its methods run
//! single-threaded and may block waiting for physical time.
//!
//! [`EventQueue`] is the reference implementation: a tag-ordered queue of
//! (tag, reaction) events, preloaded before execution starts.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::platform::clock;
use crate::reaction::Reaction;
use crate::scheduler::Scheduler;
use crate::tag::Tag;

/// The tag-advance machinery the scheduler drives.
///
/// Every method is called with the scheduler's global lock held; the
/// implementation therefore never needs its own synchronization, and
/// [`Executive::next_tag`] may block the coordinator (waiting for physical
/// time or an external grant) without racing anything.
pub trait Executive: Send {
    /// The tag currently executing (or about to execute).
    fn current_tag(&self) -> Tag;

    /// The tag execution must not advance beyond.
    fn stop_tag(&self) -> Tag;

    /// Advance logical time to the next tag and enqueue every reaction
    /// triggered at it via [`Scheduler::trigger`].
    ///
    /// Called only when the previous tag has fully drained. Leaving
    /// `current_tag` at or past [`Executive::stop_tag`] without triggering
    /// anything ends the program after the next quiescence.
    fn next_tag(&mut self, scheduler: &Scheduler);

    /// Notification that every reaction at `tag` has completed.
    ///
    /// Invoked only when the scheduler is configured federated; the default
    /// does nothing.
    fn tag_complete(&mut self, tag: Tag) {
        let _ = tag;
    }
}

/// One scheduled occurrence of a reaction.
struct Event {
    tag: Tag,
    reaction: Arc<Reaction>,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.tag.cmp(&other.tag)
    }
}

/// Tag-ordered event queue implementing [`Executive`].
///
/// Events are preloaded with [`EventQueue::schedule`] before the workers
/// start. Each `next_tag` call commits the earliest pending tag, optionally
/// sleeps until physical time has caught up with it, and triggers every
/// reaction scheduled there. When the queue runs dry the current tag jumps
/// to the stop tag, which shuts the program down at the next quiescence.
pub struct EventQueue {
    events: BinaryHeap<Reverse<Event>>,
    current: Tag,
    stop: Tag,
    realtime: bool,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    /// An empty queue starting at [`Tag::ZERO`] with no stop tag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: BinaryHeap::new(),
            current: Tag::ZERO,
            stop: Tag::FOREVER,
            realtime: false,
        }
    }

    /// An empty queue that stops once `stop` has fully executed.
    #[must_use]
    pub fn with_stop_tag(stop: Tag) -> Self {
        Self {
            events: BinaryHeap::new(),
            current: Tag::ZERO,
            stop,
            realtime: false,
        }
    }

    /// When set, `next_tag` sleeps until physical time reaches each
    /// committed tag's timestamp before triggering its reactions.
    #[must_use]
    pub fn realtime(mut self, enabled: bool) -> Self {
        self.realtime = enabled;
        self
    }

    /// Schedule `reaction` to be triggered at `tag`.
    ///
    /// Tags at or past the stop tag are accepted; events exactly at the stop
    /// tag execute, events beyond it are discarded when reached.
    pub fn schedule(&mut self, tag: Tag, reaction: Arc<Reaction>) {
        self.events.push(Reverse(Event { tag, reaction }));
    }

    /// Number of events not yet delivered.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.events.len()
    }
}

impl Executive for EventQueue {
    fn current_tag(&self) -> Tag {
        self.current
    }

    fn stop_tag(&self) -> Tag {
        self.stop
    }

    fn next_tag(&mut self, scheduler: &Scheduler) {
        let Some(Reverse(head)) = self.events.peek() else {
            log::debug!("Event queue is empty; jumping to the stop tag");
            self.current = self.stop;
            return;
        };
        let tag = head.tag;

        if tag > self.stop {
            // Everything left lies beyond the stop tag and never executes.
            log::debug!("Next event at {} is past the stop tag {}", tag, self.stop);
            self.current = self.stop;
            return;
        }

        if self.realtime {
            clock::sleep_until(tag.time);
        }

        self.current = tag;
        let mut delivered = 0usize;
        while let Some(Reverse(event)) = self.events.peek() {
            if event.tag != tag {
                break;
            }
            let Reverse(event) = self.events.pop().expect("peeked event exists");
            scheduler.trigger(&event.reaction, None);
            delivered += 1;
        }
        log::debug!("Advanced to tag {}; delivered {} event(s)", tag, delivered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{Scheduler, SchedulerConfig};
    use std::sync::atomic::Ordering;

    fn scheduler() -> Arc<Scheduler> {
        let config = SchedulerConfig {
            num_workers: 1,
            max_level: 3,
            ..Default::default()
        };
        Scheduler::new(config, Box::new(EventQueue::new())).unwrap()
    }

    #[test]
    fn empty_queue_jumps_to_stop_tag() {
        let sched = scheduler();
        let mut queue = EventQueue::with_stop_tag(Tag::at(50));
        queue.next_tag(&sched);
        assert_eq!(queue.current_tag(), Tag::at(50));
    }

    #[test]
    fn delivers_all_events_at_one_tag() {
        let sched = scheduler();
        let mut queue = EventQueue::new();
        let t0 = Tag::ZERO;
        let t1 = Tag::at(10);

        queue.schedule(t0, Reaction::new("a", 0, |_| {}));
        queue.schedule(t0, Reaction::new("b", 1, |_| {}));
        queue.schedule(t1, Reaction::new("c", 0, |_| {}));

        queue.next_tag(&sched);
        assert_eq!(queue.current_tag(), t0);
        assert_eq!(queue.pending(), 1);
        let stats = sched.stats();
        assert_eq!(stats.reactions_triggered.load(Ordering::SeqCst), 2);

        queue.next_tag(&sched);
        assert_eq!(queue.current_tag(), t1);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn events_past_stop_tag_are_not_delivered() {
        let sched = scheduler();
        let mut queue = EventQueue::with_stop_tag(Tag::at(5));
        queue.schedule(Tag::at(100), Reaction::new("late", 0, |_| {}));

        queue.next_tag(&sched);
        assert_eq!(queue.current_tag(), Tag::at(5));
        assert_eq!(sched.stats().reactions_triggered.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn microsteps_are_distinct_tags() {
        let sched = scheduler();
        let mut queue = EventQueue::new();
        queue.schedule(Tag::new(0, 1), Reaction::new("later", 0, |_| {}));
        queue.schedule(Tag::new(0, 0), Reaction::new("first", 0, |_| {}));

        queue.next_tag(&sched);
        assert_eq!(queue.current_tag(), Tag::new(0, 0));
        assert_eq!(queue.pending(), 1);

        queue.next_tag(&sched);
        assert_eq!(queue.current_tag(), Tag::new(0, 1));
    }
}
