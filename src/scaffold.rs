// src/scaffold.rs

//! `--init`: write a starter task script.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

/// Contents of a freshly scaffolded `tasks.lua`.
pub const STARTER_SCRIPT: &str = r#"-- Tasks for luatask. Run `luatask --list` to see them.

function task.default()
  description 'Says "Hello World"'
  print("Hello World")
end
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaffoldOutcome {
    Created(PathBuf),
    /// Nothing was written; the file is left untouched.
    AlreadyExists(PathBuf),
}

/// Create `path` with [`STARTER_SCRIPT`] unless it already exists.
pub fn scaffold(path: impl AsRef<Path>) -> Result<ScaffoldOutcome> {
    let path = path.as_ref();

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            return Ok(ScaffoldOutcome::AlreadyExists(path.to_path_buf()));
        }
        Err(err) => {
            return Err(err).with_context(|| format!("creating task script at {:?}", path));
        }
    };

    file.write_all(STARTER_SCRIPT.as_bytes())
        .with_context(|| format!("writing task script at {:?}", path))?;

    info!(path = %path.display(), "created starter task script");
    Ok(ScaffoldOutcome::Created(path.to_path_buf()))
}
