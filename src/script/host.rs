// src/script/host.rs

//! Host helpers installed into every environment before the script runs.
//!
//! - `write_file(path, contents)` / `read_file(path)`: whole-file IO.
//! - `sh(cmd)`: run a shell command with inherited stdio; a non-zero exit
//!   raises an error in the calling task.
//! - `os.os()`: the host operating system (`"linux"`, `"macos"`, ...).
//! - `_L`: path of the running luatask binary, for tasks that re-invoke it.
//!
//! File and process helpers are removed again by the capability gate in
//! harvest environments.

use std::fs;
use std::process::Command;

use mlua::{Lua, Table};
use tracing::debug;

pub fn install(lua: &Lua) -> mlua::Result<()> {
    let globals = lua.globals();

    globals.set(
        "write_file",
        lua.create_function(|_, (path, contents): (String, mlua::String)| {
            fs::write(&path, &*contents.as_bytes())
                .map_err(|err| mlua::Error::runtime(format!("write_file {path}: {err}")))
        })?,
    )?;

    globals.set(
        "read_file",
        lua.create_function(|lua, path: String| {
            let bytes = fs::read(&path)
                .map_err(|err| mlua::Error::runtime(format!("read_file {path}: {err}")))?;
            lua.create_string(bytes)
        })?,
    )?;

    globals.set("sh", lua.create_function(|_, cmd: String| run_shell(&cmd))?)?;

    if let Some(os) = globals.raw_get::<Option<Table>>("os")? {
        os.set(
            "os",
            lua.create_function(|_, ()| Ok(std::env::consts::OS))?,
        )?;
    }

    let program = std::env::args().next().unwrap_or_else(|| "luatask".to_string());
    globals.set("_L", program)?;

    Ok(())
}

fn run_shell(cmd: &str) -> mlua::Result<()> {
    debug!(cmd, "running shell command from task");

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    let status = command
        .status()
        .map_err(|err| mlua::Error::runtime(format!("sh: spawning '{cmd}': {err}")))?;

    if status.success() {
        Ok(())
    } else {
        Err(mlua::Error::runtime(format!(
            "sh: '{cmd}' exited with code {}",
            status.code().unwrap_or(-1)
        )))
    }
}
