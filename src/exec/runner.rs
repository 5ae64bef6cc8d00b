// src/exec/runner.rs

//! Async shell around [`QueueState`].

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use super::queue::{QueueState, QueueSummary};
use super::{QueueEvent, TaskBackend, TaskName, TaskOutcome};

/// Runs a queue of tasks through a [`TaskBackend`], one at a time.
///
/// Progress is reported as [`QueueEvent`]s. Setting the shutdown channel to
/// `true` stops the queue before the next task starts.
pub struct QueueRunner<B: TaskBackend> {
    backend: B,
    events: mpsc::Sender<QueueEvent>,
    shutdown: watch::Receiver<bool>,
}

impl<B: TaskBackend> QueueRunner<B> {
    pub fn new(
        backend: B,
        events: mpsc::Sender<QueueEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            backend,
            events,
            shutdown,
        }
    }

    pub async fn run(mut self, tasks: Vec<TaskName>, fail_fast: bool) -> QueueSummary {
        let total = tasks.len();
        let mut state = QueueState::new(tasks, fail_fast);
        let mut position = 0;

        loop {
            if *self.shutdown.borrow() && !state.is_stopping() {
                info!(remaining = state.remaining(), "shutdown requested; skipping remaining tasks");
                state.request_stop();
            }

            let Some(task) = state.next_task() else {
                break;
            };
            position += 1;

            self.emit(QueueEvent::Started {
                task: task.clone(),
                position,
                total,
            })
            .await;

            let outcome = match self.backend.run_task(task.clone()).await {
                Ok(()) => TaskOutcome::Success,
                Err(err) => TaskOutcome::Failed(err),
            };

            self.emit(QueueEvent::Finished {
                task,
                outcome: outcome.clone(),
            })
            .await;
            state.complete(outcome);
        }

        let summary = state.finish();
        for (task, outcome) in summary.results.iter() {
            if *outcome == TaskOutcome::Skipped {
                self.emit(QueueEvent::Finished {
                    task: task.clone(),
                    outcome: TaskOutcome::Skipped,
                })
                .await;
            }
        }

        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            "task queue finished"
        );
        summary
    }

    async fn emit(&self, event: QueueEvent) {
        if self.events.send(event).await.is_err() {
            debug!("queue event receiver dropped");
        }
    }
}
