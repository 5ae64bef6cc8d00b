// src/script/gate.rs

//! Capability gate applied to harvest environments.
//!
//! Listing tasks has to execute every task body to observe its directive
//! calls. The gate removes the host capabilities that would let such a
//! forced execution reach outside the Lua state: code loading, coroutines,
//! file and process access, environment mutation, debug facilities, manual
//! GC control and console output.
//!
//! This bounds the blast radius of a misbehaving task during listing. It is
//! not a security boundary: pure computation, `os.getenv`, `os.time` and the
//! string/table/math libraries stay available.

use mlua::{Lua, Table, Value};
use tracing::trace;

/// Globals (or `table.field` entries) removed before guest code runs.
pub const DENY_LIST: &[&str] = &[
    // code loading
    "dofile",
    "load",
    "loadfile",
    "loadstring",
    "require",
    "module",
    "package",
    // coroutines
    "coroutine",
    // files and processes
    "io",
    "os.execute",
    "os.exit",
    "os.remove",
    "os.rename",
    "os.setenv",
    "os.tmpname",
    "write_file",
    "read_file",
    "sh",
    // introspection and GC
    "debug",
    "collectgarbage",
    "newproxy",
    // console
    "print",
];

/// Remove every entry of [`DENY_LIST`] from the globals of `lua`.
///
/// Dotted entries clear a field of a library table; if the library itself is
/// absent the entry is skipped.
pub fn apply(lua: &Lua) -> mlua::Result<()> {
    let globals = lua.globals();

    for entry in DENY_LIST {
        match entry.split_once('.') {
            Some((table, field)) => {
                if let Some(lib) = globals.raw_get::<Option<Table>>(table)? {
                    lib.raw_set(field, Value::Nil)?;
                }
            }
            None => globals.raw_set(*entry, Value::Nil)?,
        }
    }

    trace!(denied = DENY_LIST.len(), "capability gate applied");
    Ok(())
}
