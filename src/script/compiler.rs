// src/script/compiler.rs

//! Script compiler: task-script source text to an immutable [`CompiledUnit`].
//!
//! Compilation parses the source in a scratch Lua state and dumps the
//! resulting function as bytecode. Debug info is kept so runtime errors in
//! later environments still report `tasks.lua:<line>`. No script code runs
//! here.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use mlua::{ChunkMode, Function, Lua};
use regex::Regex;
use tracing::debug;

use crate::errors::{CompileError, SourceLocation};

/// `<chunk>:<line>: <message>` as produced by the Lua parser.
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?P<chunk>.+?):(?P<line>\d+):\s*(?P<msg>.*)$").expect("valid location regex")
});

/// Immutable compiled form of a task script.
///
/// Cloning is cheap; the bytecode is shared.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    path: PathBuf,
    chunk_name: String,
    bytecode: Arc<[u8]>,
}

impl CompiledUnit {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn chunk_name(&self) -> &str {
        &self.chunk_name
    }

    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }

    /// Load the unit into `lua` as a callable top-level function.
    pub(crate) fn load_into(&self, lua: &Lua) -> mlua::Result<Function> {
        lua.load(self.bytecode())
            .set_name(format!("@{}", self.chunk_name))
            .set_mode(ChunkMode::Binary)
            .into_function()
    }
}

/// Read and compile the task script at `path`.
pub fn compile(path: impl AsRef<Path>) -> Result<CompiledUnit, CompileError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| CompileError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;

    compile_source(path, &source)
}

/// Compile already-loaded source text, attributing it to `path`.
pub fn compile_source(path: impl AsRef<Path>, source: &str) -> Result<CompiledUnit, CompileError> {
    let path = path.as_ref();
    let chunk_name = path.display().to_string();

    let lua = Lua::new();
    let function = lua
        .load(source)
        .set_name(format!("@{chunk_name}"))
        .set_mode(ChunkMode::Text)
        .into_function()
        .map_err(|err| match err {
            mlua::Error::SyntaxError { message, .. } => syntax_error(&chunk_name, &message),
            other => CompileError::Internal(other.to_string()),
        })?;

    let bytecode = function.dump(false);
    if bytecode.is_empty() {
        return Err(CompileError::Internal(format!(
            "lua produced no bytecode for {chunk_name}"
        )));
    }

    debug!(path = %chunk_name, bytes = bytecode.len(), "compiled task script");

    Ok(CompiledUnit {
        path: path.to_path_buf(),
        chunk_name,
        bytecode: Arc::from(bytecode),
    })
}

fn syntax_error(chunk_name: &str, raw: &str) -> CompileError {
    let first_line = raw.lines().next().unwrap_or(raw).trim();

    match LOCATION_RE.captures(first_line) {
        Some(caps) => CompileError::Syntax {
            location: SourceLocation {
                chunk: caps["chunk"].trim_start_matches(['@', '=']).to_string(),
                line: caps["line"].parse().ok(),
            },
            message: caps["msg"].to_string(),
        },
        None => CompileError::Syntax {
            location: SourceLocation {
                chunk: chunk_name.to_string(),
                line: None,
            },
            message: first_line.to_string(),
        },
    }
}
