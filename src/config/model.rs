// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::script::EngineOptions;

/// Top-level configuration as read from `Luatask.toml`.
///
/// ```toml
/// [config]
/// taskfile = "tasks.lua"
/// harvest_timeout_ms = 60
/// task_harvest_timeout_ms = 60
/// default_task = "default"
/// fail_fast = false
/// ```
///
/// The file and every key in it are optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Task script to load.
    #[serde(default = "default_taskfile")]
    pub taskfile: String,

    /// Bound on the script's top-level body while listing tasks.
    #[serde(default = "default_harvest_timeout_ms")]
    pub harvest_timeout_ms: u64,

    /// Bound on each task body while listing tasks. `0` disables it.
    #[serde(default = "default_harvest_timeout_ms")]
    pub task_harvest_timeout_ms: u64,

    /// Task run when no task names are given.
    #[serde(default = "default_task")]
    pub default_task: String,

    /// Stop the queue at the first failing task.
    #[serde(default)]
    pub fail_fast: bool,
}

pub fn default_taskfile() -> String {
    "tasks.lua".to_string()
}

fn default_harvest_timeout_ms() -> u64 {
    crate::script::DEFAULT_HARVEST_TIMEOUT.as_millis() as u64
}

fn default_task() -> String {
    "default".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            taskfile: default_taskfile(),
            harvest_timeout_ms: default_harvest_timeout_ms(),
            task_harvest_timeout_ms: default_harvest_timeout_ms(),
            default_task: default_task(),
            fail_fast: false,
        }
    }
}

/// Validated configuration.
///
/// Built from [`RawConfigFile`] via `TryFrom`, see `validate.rs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub taskfile: PathBuf,
    pub harvest_timeout: Duration,
    pub task_harvest_timeout: Option<Duration>,
    pub default_task: String,
    pub fail_fast: bool,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(section: ConfigSection) -> Self {
        Self {
            taskfile: PathBuf::from(section.taskfile),
            harvest_timeout: Duration::from_millis(section.harvest_timeout_ms),
            task_harvest_timeout: match section.task_harvest_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
            default_task: section.default_task,
            fail_fast: section.fail_fast,
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            harvest_timeout: self.harvest_timeout,
            task_harvest_timeout: self.task_harvest_timeout,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(ConfigSection::default())
    }
}
