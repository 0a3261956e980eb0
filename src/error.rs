//! Error types for reactor-sched
//!
//! This module provides error handling types used throughout the library.

use thiserror::Error;

/// Main error type for scheduler operations.
///
/// These cover recoverable construction-time failures only. Invariant
/// violations at runtime (a reaction finishing in an unexpected status, a
/// reaction leveled beyond the configured maximum) are programming or
/// configuration bugs and abort with a panic instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Scheduler configuration was rejected
    #[error("Invalid scheduler configuration: {reason}")]
    InvalidConfig {
        /// Reason the configuration was rejected
        reason: String,
    },

    /// A worker thread could not be spawned
    #[error("Failed to spawn worker thread: {reason}")]
    WorkerSpawn {
        /// Reason for the spawn failure
        reason: String,
    },

    /// A worker thread panicked and its result could not be joined
    #[error("Worker thread {worker} panicked")]
    WorkerPanicked {
        /// Index of the worker that panicked
        worker: usize,
    },
}

/// Convenient result type alias
pub type Result<T> = std::result::Result<T, Error>;
