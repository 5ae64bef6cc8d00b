// src/exec/queue.rs

//! Pure task queue state.
//!
//! Decides which task runs next given the outcomes so far. It has no
//! channels, no Tokio types and does no IO; the async shell in
//! [`crate::exec::runner`] drives it.

use std::collections::VecDeque;

use super::{TaskName, TaskOutcome};

/// Sequential queue of task names.
///
/// Semantics:
/// - Tasks run one at a time, in the order given.
/// - A failure does not stop later tasks unless `fail_fast` is set.
/// - After [`QueueState::request_stop`] no further task is handed out; the
///   remaining ones are reported as skipped.
#[derive(Debug)]
pub struct QueueState {
    pending: VecDeque<TaskName>,
    running: Option<TaskName>,
    results: Vec<(TaskName, TaskOutcome)>,
    fail_fast: bool,
    stopping: bool,
}

impl QueueState {
    pub fn new(tasks: impl IntoIterator<Item = TaskName>, fail_fast: bool) -> Self {
        Self {
            pending: tasks.into_iter().collect(),
            running: None,
            results: Vec::new(),
            fail_fast,
            stopping: false,
        }
    }

    /// Take the next task to run, if the queue should continue.
    ///
    /// Returns `None` while a task is still running.
    pub fn next_task(&mut self) -> Option<TaskName> {
        if self.stopping || self.running.is_some() {
            return None;
        }
        let task = self.pending.pop_front()?;
        self.running = Some(task.clone());
        Some(task)
    }

    /// Record the outcome of the running task.
    pub fn complete(&mut self, outcome: TaskOutcome) {
        let Some(task) = self.running.take() else {
            return;
        };

        if self.fail_fast && matches!(outcome, TaskOutcome::Failed(_)) {
            self.stopping = true;
        }
        self.results.push((task, outcome));
    }

    /// Stop handing out tasks. The running task, if any, may still complete.
    pub fn request_stop(&mut self) {
        self.stopping = true;
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Close the queue; tasks that never started are marked skipped.
    pub fn finish(mut self) -> QueueSummary {
        if let Some(task) = self.running.take() {
            self.results.push((task, TaskOutcome::Skipped));
        }
        self.results
            .extend(self.pending.drain(..).map(|task| (task, TaskOutcome::Skipped)));
        QueueSummary {
            results: self.results,
        }
    }
}

/// Outcome of every task in a queue, in queue order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueSummary {
    pub results: Vec<(TaskName, TaskOutcome)>,
}

impl QueueSummary {
    pub fn all_succeeded(&self) -> bool {
        self.results
            .iter()
            .all(|(_, outcome)| *outcome == TaskOutcome::Success)
    }

    pub fn count(&self, wanted: fn(&TaskOutcome) -> bool) -> usize {
        self.results.iter().filter(|(_, outcome)| wanted(outcome)).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|outcome| matches!(outcome, TaskOutcome::Success))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, TaskOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, TaskOutcome::Skipped))
    }
}
