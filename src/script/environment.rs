// src/script/environment.rs

//! Environment instantiator.
//!
//! Every `list` harvest pass and every `run` gets its own
//! [`ExecutionEnvironment`]: a brand new Lua state with an empty `task`
//! table, the directive bindings for its mode, the capability gate if it is a
//! harvest environment, and the compiled unit's top-level body already
//! executed. Nothing carries over between two environments.

use std::time::Duration;

use mlua::{Function, Lua, LuaOptions, StdLib, Table, Value};
use thiserror::Error;
use tracing::debug;

use crate::errors::HarvestError;
use crate::script::compiler::CompiledUnit;
use crate::script::deadline::DeadlineGuard;
use crate::script::directives::{self, CaptureSlot, DirectiveMode};
use crate::script::{gate, guest_message, host};

/// Global table guest code registers its tasks in.
pub const TASK_NAMESPACE: &str = "task";

/// How to build an environment.
#[derive(Debug, Clone)]
pub struct EnvironmentSettings {
    pub directives: DirectiveMode,
    /// Apply the capability gate before any guest code runs.
    pub gated: bool,
    /// Bound on the top-level body.
    pub deadline: Option<Duration>,
}

impl EnvironmentSettings {
    /// Gated, capture-bound, time-bounded: used for listing.
    pub fn harvest(slot: CaptureSlot, deadline: Duration) -> Self {
        Self {
            directives: DirectiveMode::Capture(slot),
            gated: true,
            deadline: Some(deadline),
        }
    }

    /// Ungated, suppressed directives, unbounded: used for running a task.
    pub fn trusted() -> Self {
        Self {
            directives: DirectiveMode::Suppress,
            gated: false,
            deadline: None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstantiateError {
    #[error("{0}")]
    Runtime(String),

    #[error("top-level body exceeded {0:?}")]
    Timeout(Duration),
}

/// A single-use guest runtime.
pub struct ExecutionEnvironment {
    lua: Lua,
}

impl ExecutionEnvironment {
    /// Build a fresh environment and run the unit's top-level body in it.
    pub fn instantiate(
        unit: &CompiledUnit,
        settings: &EnvironmentSettings,
    ) -> Result<Self, InstantiateError> {
        // SAFETY: the only binary chunk ever loaded is bytecode dumped by
        // `compiler::compile_source` in this process; no C modules or the
        // debug library are opened.
        let lua = unsafe { Lua::unsafe_new_with(StdLib::ALL_SAFE, LuaOptions::new()) };

        prepare(&lua, settings).map_err(|err| InstantiateError::Runtime(guest_message(&err)))?;

        let main = unit
            .load_into(&lua)
            .map_err(|err| InstantiateError::Runtime(guest_message(&err)))?;

        debug!(
            script = unit.chunk_name(),
            gated = settings.gated,
            deadline = ?settings.deadline,
            "running top-level body"
        );

        let result = {
            let guard = settings
                .deadline
                .map(|budget| (budget, DeadlineGuard::arm(&lua, budget)));
            let result = main.call::<()>(());

            // A fired deadline is final even if the guest caught the hook error.
            if let Some((budget, guard)) = guard {
                if guard.fired() {
                    return Err(InstantiateError::Timeout(budget));
                }
            }
            result
        };

        match result {
            Ok(()) => Ok(Self { lua }),
            Err(err) => Err(InstantiateError::Runtime(guest_message(&err))),
        }
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// The guest `task` table as left by the top-level body.
    pub fn task_table(&self) -> Result<Table, HarvestError> {
        match self.lua.globals().raw_get::<Value>(TASK_NAMESPACE) {
            Ok(Value::Table(table)) => Ok(table),
            Ok(other) => Err(HarvestError::TaskTable(other.type_name().to_string())),
            Err(err) => Err(HarvestError::Runtime(guest_message(&err))),
        }
    }

    /// Look up a live task closure by name.
    pub fn task(&self, name: &str) -> Option<Function> {
        let table = self.task_table().ok()?;
        match table.raw_get::<Value>(name) {
            Ok(Value::Function(function)) => Some(function),
            _ => None,
        }
    }
}

fn prepare(lua: &Lua, settings: &EnvironmentSettings) -> mlua::Result<()> {
    host::install(lua)?;
    lua.globals().raw_set(TASK_NAMESPACE, lua.create_table()?)?;
    directives::bind(lua, &settings.directives)?;
    if settings.gated {
        gate::apply(lua)?;
    }
    Ok(())
}
