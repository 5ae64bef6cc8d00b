// src/errors.rs

//! Crate-wide error types.
//!
//! The script engine reports typed errors per operation so callers can render
//! each kind differently:
//! - [`CompileError`] from `Engine::compile`
//! - [`HarvestError`] from `Engine::list`
//! - [`RunError`] from `Engine::run`
//! - [`CaptureError`] is never returned; it is folded into the `TaskMeta` of
//!   the one task whose metadata capture failed.
//!
//! [`LuataskError`] covers config loading; the CLI layers render the engine
//! errors themselves and use `anyhow` for everything else.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Where in the task script a syntax error was reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub chunk: String,
    pub line: Option<u32>,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.chunk, line),
            None => write!(f, "{}", self.chunk),
        }
    }
}

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("task script not found: {}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error at {location}: {message}")]
    Syntax {
        location: SourceLocation,
        message: String,
    },

    #[error("internal compile error: {0}")]
    Internal(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HarvestError {
    #[error(
        "task script took too long to run (>{0:?}); make sure it's not doing heavy computations outside of tasks"
    )]
    Timeout(Duration),

    #[error("task script failed: {0}")]
    Runtime(String),

    #[error("global 'task' is of type {0}; expected table")]
    TaskTable(String),
}

/// Failure while capturing a single task's metadata during harvest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("type error: {0}")]
    Type(String),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error("task body took too long during listing (>{0:?})")]
    Timeout(Duration),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("task not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Harvest(#[from] HarvestError),

    #[error("task failed: {0}")]
    Runtime(String),
}

#[derive(Error, Debug)]
pub enum LuataskError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LuataskError>;
