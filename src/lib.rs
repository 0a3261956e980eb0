//! # reactor-sched
//!
//! A Global Earliest-Deadline-First, non-preemptive scheduler for a
//! deterministic reactor execution model.
//!
//! Reactions, externally defined units of computation, fire at discrete
//! *logical tags*. Every reaction carries a static precedence *level*; at a
//! given tag the scheduler drains level 0, then level 1, and so on, running
//! same-level reactions in parallel across a fixed pool of worker threads.
//! When all levels are empty the last idle worker advances the tag through
//! an [`Executive`] and the cycle repeats until the stop tag is reached.
//!
//! ## Guarantees
//!
//! - A reaction at a lower level always completes before any reaction at a
//!   higher level of the same tag begins.
//! - Reactions at the same level may run concurrently, ordered within the
//!   level by their inferred deadlines.
//! - A reaction is never enqueued twice at the same tag, and tag `n + 1`
//!   begins only after everything at tag `n` has completed.
//!
//! ## Quick Start
//!
//! ```rust
//! use reactor_sched::{EventQueue, Reaction, Runtime, SchedulerConfig, Tag};
//!
//! // Schedule one reaction at the origin of logical time and stop there.
//! let mut events = EventQueue::with_stop_tag(Tag::ZERO);
//! let hello = Reaction::new("hello", 0, |_| println!("hello at (0, 0)"));
//! events.schedule(Tag::ZERO, hello);
//!
//! let config = SchedulerConfig {
//!     num_workers: 2,
//!     max_level: 3,
//!     ..Default::default()
//! };
//! let runtime = Runtime::with_config(config, Box::new(events)).unwrap();
//! let stats = runtime.run().unwrap();
//! assert_eq!(stats.reactions_executed.load(std::sync::atomic::Ordering::SeqCst), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod error;
pub mod executive;
pub mod platform;
pub mod reaction;
pub mod runtime;
pub mod scheduler;
pub mod tag;

pub use error::{Error, Result};
pub use executive::{EventQueue, Executive};
pub use reaction::{Reaction, ReactionContext, ReactionIndex, ReactionStatus};
pub use runtime::Runtime;
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerStats, WorkerId, WorkerPool};
pub use tag::Tag;
