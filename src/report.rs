// src/report.rs

//! Plain-text rendering of listings, errors and queue progress.
//!
//! The engine never formats user-facing messages itself; everything the CLI
//! prints goes through here.

use std::fmt::Write as _;
use std::path::Path;

use tokio::sync::mpsc;

use crate::errors::{CompileError, HarvestError, RunError};
use crate::exec::{QueueEvent, QueueSummary, TaskOutcome};
use crate::script::TaskRegistry;

const PREFIX: &str = "luatask";
const ERR_PREFIX: &str = "luatask [error]";

/// Task listing, sorted by name.
pub fn render_listing(registry: &TaskRegistry) -> String {
    if registry.is_empty() {
        return format!("{ERR_PREFIX}: no tasks available");
    }

    let mut out = format!("{PREFIX}: all available tasks:");
    for task in registry.sorted() {
        if task.description.is_empty() {
            let _ = write!(out, "\n- {} (description not found)", task.name);
        } else {
            let _ = write!(out, "\n- {}: {}", task.name, task.description);
        }

        if !task.dependencies.is_empty() {
            let _ = write!(out, "\n  depends: {}", task.dependencies.join(", "));
        }
        if !task.sources.is_empty() {
            let _ = write!(out, "\n  tracks: {}", task.sources.join(", "));
        }
        if let Some(err) = &task.capture_error {
            let _ = write!(out, "\n  (metadata may be incomplete: {err})");
        }
    }
    out
}

/// Compile failures, each kind phrased for the user.
///
/// `cwd` is only used to say where the script was looked for.
pub fn render_compile_error(err: &CompileError, cwd: &Path) -> String {
    match err {
        CompileError::NotFound { path, .. } => format!(
            "{ERR_PREFIX}: {} was not found in {}: use {PREFIX} --init to create a new one",
            path.display(),
            cwd.display()
        ),
        CompileError::Syntax { location, message } => {
            format!("{ERR_PREFIX}: parse error:\n{location}: {message}")
        }
        CompileError::Internal(message) => format!("{ERR_PREFIX}: error:\n{message}"),
    }
}

pub fn render_harvest_error(err: &HarvestError) -> String {
    format!("{ERR_PREFIX}: could not list tasks: {err}")
}

pub fn render_run_error(task: &str, err: &RunError) -> String {
    match err {
        RunError::NotFound(_) => format!("{ERR_PREFIX}: task {task} not found"),
        RunError::Harvest(err) => render_harvest_error(err),
        RunError::Runtime(message) => format!("{ERR_PREFIX}: task {task} failed:\n{message}"),
    }
}

/// One line per queue event, or `None` for events that print nothing.
pub fn render_event(event: &QueueEvent) -> Option<String> {
    match event {
        QueueEvent::Started {
            task,
            position,
            total,
        } => Some(format!("{PREFIX}: running {task} ({position}/{total})")),
        QueueEvent::Finished { task, outcome } => match outcome {
            TaskOutcome::Success => Some(format!("{PREFIX}: task complete: {task}")),
            TaskOutcome::Failed(err) => Some(render_run_error(task, err)),
            TaskOutcome::Skipped => Some(format!("{PREFIX}: task skipped: {task}")),
        },
    }
}

pub fn render_summary(summary: &QueueSummary) -> Option<String> {
    if summary.results.len() < 2 {
        return None;
    }
    Some(format!(
        "{PREFIX}: {} succeeded, {} failed, {} skipped",
        summary.succeeded(),
        summary.failed(),
        summary.skipped()
    ))
}

/// Print queue events until the sender side closes.
///
/// Progress goes to stderr so stdout stays with the tasks.
pub async fn print_events(mut rx: mpsc::Receiver<QueueEvent>) {
    while let Some(event) = rx.recv().await {
        if let Some(line) = render_event(&event) {
            eprintln!("{line}");
        }
    }
}
