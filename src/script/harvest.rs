// src/script/harvest.rs

//! Metadata harvester.
//!
//! Harvesting runs the script in a gated, capture-bound environment and then
//! calls every task closure once to observe its directive calls. The whole
//! task body executes, not just its directives, so any other work a task
//! does also happens here; the capability gate keeps that work away from
//! files, processes and the console.
//!
//! Failures are split in two levels:
//! - the top-level body failing or timing out fails the harvest;
//! - a single task failing only marks that task's [`TaskMeta`] with a
//!   [`CaptureError`], keeping whatever was captured before the failure.

use std::time::Duration;

use mlua::{Function, Table, Value};
use tracing::{debug, trace};

use crate::errors::{CaptureError, HarvestError};
use crate::script::compiler::CompiledUnit;
use crate::script::deadline::DeadlineGuard;
use crate::script::directives::CaptureSlot;
use crate::script::environment::{EnvironmentSettings, ExecutionEnvironment, InstantiateError};
use crate::script::guest_message;
use crate::script::registry::{TaskMeta, TaskRegistry};

/// Time bounds for one harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestLimits {
    /// Bound on the script's top-level body.
    pub top_level: Duration,
    /// Bound on each task body; `None` lets task bodies run unbounded.
    pub per_task: Option<Duration>,
}

/// Run a full harvest pass over `unit`.
pub fn harvest(unit: &CompiledUnit, limits: &HarvestLimits) -> Result<TaskRegistry, HarvestError> {
    let slot = CaptureSlot::new();
    let settings = EnvironmentSettings::harvest(slot.clone(), limits.top_level);

    let env = ExecutionEnvironment::instantiate(unit, &settings).map_err(|err| match err {
        InstantiateError::Timeout(budget) => HarvestError::Timeout(budget),
        InstantiateError::Runtime(message) => HarvestError::Runtime(message),
    })?;

    let candidates = discover(env.task_table()?)?;
    debug!(candidates = candidates.len(), "discovered task candidates");

    let metas: Vec<TaskMeta> = candidates
        .into_iter()
        .map(|(name, function)| capture_task(&env, &slot, name, &function, limits.per_task))
        .collect();

    Ok(TaskRegistry::from_tasks(metas))
}

/// String keys holding functions. Everything else in the table is data.
///
/// Candidates are collected up front so task bodies that modify the `task`
/// table cannot disturb the iteration.
fn discover(table: Table) -> Result<Vec<(String, Function)>, HarvestError> {
    let mut candidates = Vec::new();

    for pair in table.pairs::<Value, Value>() {
        let (key, value) = pair.map_err(|err| HarvestError::Runtime(guest_message(&err)))?;

        if let (Value::String(key), Value::Function(function)) = (key, value) {
            match key.to_str() {
                Ok(name) => candidates.push((name.to_string(), function)),
                Err(_) => trace!("skipping task key that is not valid UTF-8"),
            }
        }
    }

    Ok(candidates)
}

fn capture_task(
    env: &ExecutionEnvironment,
    slot: &CaptureSlot,
    name: String,
    function: &Function,
    deadline: Option<Duration>,
) -> TaskMeta {
    slot.begin();

    let guard = deadline.map(|budget| DeadlineGuard::arm(env.lua(), budget));
    let result = function.call::<()>(());
    let timed_out = guard.as_ref().is_some_and(DeadlineGuard::fired);
    drop(guard);

    let capture = slot.finish();

    // A fired deadline is final even if the task body caught the hook error.
    let capture_error = match (deadline, capture.type_error, result) {
        (Some(budget), _, _) if timed_out => Some(CaptureError::Timeout(budget)),
        (_, Some(message), _) => Some(CaptureError::Type(message)),
        (_, None, Err(err)) => Some(CaptureError::Runtime(guest_message(&err))),
        (_, None, Ok(())) => None,
    };

    match &capture_error {
        Some(err) => debug!(task = %name, error = %err, "could not capture task metadata"),
        None => trace!(task = %name, "captured task metadata"),
    }

    TaskMeta {
        name,
        description: capture.description,
        dependencies: capture.dependencies,
        sources: capture.sources,
        capture_error,
    }
}
