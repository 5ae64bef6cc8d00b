// src/script/registry.rs

//! Task metadata and the registry produced by one harvest.

use std::collections::HashMap;

use crate::errors::CaptureError;

/// Declared metadata of one task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskMeta {
    /// Key of the task in the guest `task` table.
    pub name: String,
    /// Empty when the task never called `description`.
    pub description: String,
    /// Names passed to `depends`, as written. Never resolved.
    pub dependencies: Vec<String>,
    pub sources: Vec<String>,
    /// Set when running the task body during harvest failed. The fields
    /// above then hold whatever was captured before the failure.
    pub capture_error: Option<CaptureError>,
}

impl TaskMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.capture_error.is_none()
    }
}

/// Opaque reference to a task closure.
///
/// Closures die with the environment that created them, so the handle keeps
/// what is needed to find the same closure again in a fresh environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    key: String,
}

impl TaskHandle {
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }
}

/// Metadata paired with the handle needed to invoke the task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredTask {
    pub meta: TaskMeta,
    handle: TaskHandle,
}

impl RegisteredTask {
    pub fn handle(&self) -> &TaskHandle {
        &self.handle
    }
}

/// Result of one harvest.
///
/// Entries keep harvest order, which follows Lua table iteration and is
/// therefore unspecified; use [`TaskRegistry::sorted`] for stable output.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TaskRegistry {
    tasks: Vec<RegisteredTask>,
    index: HashMap<String, usize>,
}

impl TaskRegistry {
    pub(crate) fn from_tasks(metas: impl IntoIterator<Item = TaskMeta>) -> Self {
        let mut registry = Self::default();
        for meta in metas {
            if registry.index.contains_key(&meta.name) {
                continue;
            }
            registry.index.insert(meta.name.clone(), registry.tasks.len());
            registry.tasks.push(RegisteredTask {
                handle: TaskHandle::new(meta.name.clone()),
                meta,
            });
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTask> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    /// Metadata in harvest order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskMeta> {
        self.tasks.iter().map(|task| &task.meta)
    }

    /// Metadata sorted by task name.
    pub fn sorted(&self) -> Vec<&TaskMeta> {
        let mut metas: Vec<&TaskMeta> = self.iter().collect();
        metas.sort_by(|a, b| a.name.cmp(&b.name));
        metas
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|meta| meta.name.as_str())
    }
}
