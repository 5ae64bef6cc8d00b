// src/script/mod.rs

//! Task-script execution engine.
//!
//! - [`compiler`] turns `tasks.lua` into an immutable [`CompiledUnit`].
//! - [`environment`] builds a fresh Lua state per call, optionally behind the
//!   capability [`gate`] and a [`deadline`].
//! - [`directives`] binds `description`, `depends`, `sources` and `defer`.
//! - [`harvest`] lists tasks by running them under capture.
//! - [`invoke`] runs one task for real.
//!
//! [`Engine`] ties these together and caches the harvested
//! [`TaskRegistry`] for its lifetime.

pub mod compiler;
pub mod deadline;
pub mod directives;
pub mod environment;
pub mod gate;
pub mod harvest;
pub mod host;
pub mod invoke;
pub mod registry;

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::errors::{CompileError, HarvestError, RunError};

pub use compiler::CompiledUnit;
pub use harvest::HarvestLimits;
pub use registry::{RegisteredTask, TaskHandle, TaskMeta, TaskRegistry};

/// Default bound on the top-level body during listing. Anything well under
/// 100ms still feels instant on the command line.
pub const DEFAULT_HARVEST_TIMEOUT: Duration = Duration::from_millis(60);

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub harvest_timeout: Duration,
    /// Bound on each task body during listing; `None` disables it.
    pub task_harvest_timeout: Option<Duration>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            harvest_timeout: DEFAULT_HARVEST_TIMEOUT,
            task_harvest_timeout: Some(DEFAULT_HARVEST_TIMEOUT),
        }
    }
}

impl EngineOptions {
    fn limits(&self) -> HarvestLimits {
        HarvestLimits {
            top_level: self.harvest_timeout,
            per_task: self.task_harvest_timeout,
        }
    }
}

/// One compiled task script plus its lazily harvested registry.
///
/// `Engine` is `Send + Sync`: Lua states only ever live inside a single
/// `list` or `run` call.
#[derive(Debug)]
pub struct Engine {
    unit: CompiledUnit,
    options: EngineOptions,
    registry: Mutex<Option<Arc<TaskRegistry>>>,
}

impl Engine {
    /// Compile the script at `path`.
    pub fn compile(path: impl AsRef<Path>, options: EngineOptions) -> Result<Self, CompileError> {
        Ok(Self::from_unit(compiler::compile(path)?, options))
    }

    pub fn from_unit(unit: CompiledUnit, options: EngineOptions) -> Self {
        Self {
            unit,
            options,
            registry: Mutex::new(None),
        }
    }

    pub fn unit(&self) -> &CompiledUnit {
        &self.unit
    }

    /// Harvest task metadata, or return the registry harvested earlier.
    ///
    /// A failed harvest is not cached.
    pub fn list(&self) -> Result<Arc<TaskRegistry>, HarvestError> {
        let mut cached = self.registry.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(registry) = cached.as_ref() {
            debug!("using cached task registry");
            return Ok(Arc::clone(registry));
        }

        let registry = Arc::new(harvest::harvest(&self.unit, &self.options.limits())?);
        debug!(tasks = registry.len(), "harvested task registry");

        *cached = Some(Arc::clone(&registry));
        Ok(registry)
    }

    /// Run the task `name` in a trusted environment.
    pub fn run(&self, name: &str) -> Result<(), RunError> {
        let registry = self.list()?;
        invoke::invoke(&self.unit, &registry, name)
    }
}

/// Message of a guest error without the Lua traceback.
pub(crate) fn guest_message(err: &mlua::Error) -> String {
    match err {
        mlua::Error::CallbackError { cause, .. } => guest_message(cause),
        mlua::Error::RuntimeError(message) => strip_traceback(message),
        other => strip_traceback(&other.to_string()),
    }
}

fn strip_traceback(message: &str) -> String {
    match message.find("\nstack traceback:") {
        Some(end) => message[..end].to_string(),
        None => message.to_string(),
    }
}
