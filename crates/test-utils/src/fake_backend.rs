use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use luatask::errors::RunError;
use luatask::exec::{TaskBackend, TaskName};

/// A fake backend that:
/// - records which tasks were "run"
/// - fails the tasks it was told to fail, succeeds otherwise.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    executed: Arc<Mutex<Vec<String>>>,
    failing: HashSet<String>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, task: &str) -> Self {
        self.failing.insert(task.to_string());
        self
    }

    /// Shared log of executed task names, in execution order.
    pub fn executed(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.executed)
    }
}

impl TaskBackend for FakeBackend {
    fn run_task(
        &mut self,
        task: TaskName,
    ) -> Pin<Box<dyn Future<Output = Result<(), RunError>> + Send + '_>> {
        let executed = Arc::clone(&self.executed);
        let fails = self.failing.contains(&task);

        Box::pin(async move {
            {
                let mut guard = executed.lock().unwrap();
                guard.push(task.clone());
            }

            if fails {
                Err(RunError::Runtime(format!("{task} failed on purpose")))
            } else {
                Ok(())
            }
        })
    }
}
