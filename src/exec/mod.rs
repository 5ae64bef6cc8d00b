// src/exec/mod.rs

//! Task queue execution layer.
//!
//! Runs the task names given on the command line one after another and
//! reports progress as [`QueueEvent`]s.
//!
//! - [`queue`] holds the pure queue state (what runs next, fail-fast,
//!   skipped tasks).
//! - [`runner`] is the async shell that drives the queue.
//! - [`backend`] provides the `TaskBackend` trait and the production
//!   `EngineBackend`, which tests can replace with a fake implementation.

use crate::errors::RunError;

pub mod backend;
pub mod queue;
pub mod runner;

/// Canonical task name type used by the queue.
pub type TaskName = String;

/// Outcome of one queued task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(RunError),
    /// Never started (fail-fast or shutdown).
    Skipped,
}

/// Progress events emitted by the queue runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    Started {
        task: TaskName,
        position: usize,
        total: usize,
    },
    Finished {
        task: TaskName,
        outcome: TaskOutcome,
    },
}

pub use backend::{EngineBackend, TaskBackend};
pub use queue::{QueueState, QueueSummary};
pub use runner::QueueRunner;
