//! GEDF non-preemptive scheduler
//!
//! This module provides the level-ordered reaction scheduler: per-level
//! priority queues, the idle-coordination core, and the worker threads that
//! drain it.

pub mod core;
pub mod levels;
pub mod queue;
pub mod worker;

pub use self::core::{Scheduler, SchedulerConfig, SchedulerStats};
pub use levels::LevelTable;
pub use queue::ReactionQueue;
pub use worker::{WorkerId, WorkerPool};
