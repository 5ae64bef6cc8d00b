// src/exec/backend.rs

//! Pluggable task backend abstraction.
//!
//! The queue runner talks to a `TaskBackend` instead of the engine directly.
//! This makes it easy to swap in a fake backend in tests.
//!
//! - `EngineBackend` is the production implementation. It runs each task
//!   through [`Engine::run`] on Tokio's blocking pool, because a Lua task
//!   body is synchronous and may run for a long time.
//! - Tests can provide their own `TaskBackend` that, for example, records
//!   which tasks were run and fails selected ones.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::RunError;
use crate::script::Engine;

use super::TaskName;

/// Trait abstracting how a single task is executed.
pub trait TaskBackend: Send {
    /// Run `task` to completion.
    fn run_task(
        &mut self,
        task: TaskName,
    ) -> Pin<Box<dyn Future<Output = Result<(), RunError>> + Send + '_>>;
}

/// Real backend used in production.
#[derive(Debug, Clone)]
pub struct EngineBackend {
    engine: Arc<Engine>,
}

impl EngineBackend {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }
}

impl TaskBackend for EngineBackend {
    fn run_task(
        &mut self,
        task: TaskName,
    ) -> Pin<Box<dyn Future<Output = Result<(), RunError>> + Send + '_>> {
        // Clone the engine handle so the blocking closure owns it.
        let engine = Arc::clone(&self.engine);

        Box::pin(async move {
            match tokio::task::spawn_blocking(move || engine.run(&task)).await {
                Ok(result) => result,
                Err(err) => Err(RunError::Runtime(format!("task thread failed: {err}"))),
            }
        })
    }
}
