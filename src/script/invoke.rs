// src/script/invoke.rs

//! Task invoker: runs one task in a trusted environment.

use tracing::info;

use crate::errors::RunError;
use crate::script::compiler::CompiledUnit;
use crate::script::environment::{EnvironmentSettings, ExecutionEnvironment};
use crate::script::guest_message;
use crate::script::registry::TaskRegistry;

/// Run the task `name` from `registry` to completion.
///
/// The name is checked against the registry before any environment is
/// built, so an unknown name never executes guest code.
pub fn invoke(unit: &CompiledUnit, registry: &TaskRegistry, name: &str) -> Result<(), RunError> {
    let task = registry
        .get(name)
        .ok_or_else(|| RunError::NotFound(name.to_string()))?;

    let env = ExecutionEnvironment::instantiate(unit, &EnvironmentSettings::trusted())
        .map_err(|err| RunError::Runtime(err.to_string()))?;

    // The top-level body ran again in this environment; the closure has to
    // be looked up afresh.
    let function = env
        .task(task.handle().key())
        .ok_or_else(|| RunError::NotFound(name.to_string()))?;

    info!(task = name, "running task");
    function
        .call::<()>(())
        .map_err(|err| RunError::Runtime(guest_message(&err)))?;
    info!(task = name, "task finished");

    Ok(())
}
