// src/script/directives.rs

//! Directive bindings: `description`, `depends`, `sources` and `defer`.
//!
//! Guest code calls these to annotate a task:
//!
//! ```lua
//! function task.build()
//!   description "Builds the thing"
//!   sources { "src/main.c", "src/util.c" }
//!   sh "make"
//! end
//! ```
//!
//! Each directive has two modes:
//! - [`DirectiveMode::Suppress`]: used for trusted runs. Every directive is a
//!   no-op that accepts anything, so task bodies never fail because of them.
//! - [`DirectiveMode::Capture`]: used for harvesting. Calls are recorded into
//!   the task currently open in the [`CaptureSlot`]. Calls made while no task
//!   is open (from the script's top level) are accepted and discarded.
//!
//! `defer` is registered in both modes but has no effect.

use std::cell::RefCell;
use std::rc::Rc;

use mlua::{Lua, MultiValue, Value, Variadic};

/// Names of every directive bound into guest globals.
pub const DIRECTIVES: [&str; 4] = ["description", "depends", "sources", "defer"];

/// Metadata recorded for one task while its body runs under capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capture {
    pub description: String,
    pub dependencies: Vec<String>,
    pub sources: Vec<String>,
    /// First directive type error raised while this task was open.
    pub type_error: Option<String>,
}

/// Shared slot the capture-mode directives write into.
///
/// The harvester opens the slot before invoking a task closure and takes the
/// result afterwards.
#[derive(Debug, Clone, Default)]
pub struct CaptureSlot(Rc<RefCell<Option<Capture>>>);

impl CaptureSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start capturing a new task, dropping anything left from the last one.
    pub fn begin(&self) {
        *self.0.borrow_mut() = Some(Capture::default());
    }

    /// Stop capturing and return what was recorded.
    pub fn finish(&self) -> Capture {
        self.0.borrow_mut().take().unwrap_or_default()
    }

    /// Apply `update` to the open capture.
    ///
    /// With no open capture the call is a no-op. An `Err` from `update` is
    /// remembered as the task's type error and raised into guest code.
    fn record(
        &self,
        update: impl FnOnce(&mut Capture) -> Result<(), String>,
    ) -> mlua::Result<()> {
        let mut slot = self.0.borrow_mut();
        let Some(capture) = slot.as_mut() else {
            return Ok(());
        };

        match update(capture) {
            Ok(()) => Ok(()),
            Err(message) => {
                capture.type_error.get_or_insert_with(|| message.clone());
                Err(mlua::Error::runtime(message))
            }
        }
    }
}

/// How directives behave inside an environment.
#[derive(Debug, Clone)]
pub enum DirectiveMode {
    Capture(CaptureSlot),
    Suppress,
}

/// Bind all four directives as globals of `lua` in the given mode.
pub fn bind(lua: &Lua, mode: &DirectiveMode) -> mlua::Result<()> {
    match mode {
        DirectiveMode::Suppress => bind_suppressed(lua),
        DirectiveMode::Capture(slot) => bind_capturing(lua, slot),
    }
}

fn bind_suppressed(lua: &Lua) -> mlua::Result<()> {
    let globals = lua.globals();
    for name in DIRECTIVES {
        globals.set(name, lua.create_function(|_, _: MultiValue| Ok(()))?)?;
    }
    Ok(())
}

fn bind_capturing(lua: &Lua, slot: &CaptureSlot) -> mlua::Result<()> {
    let globals = lua.globals();

    let description = {
        let slot = slot.clone();
        lua.create_function(move |lua, value: Value| {
            let text = match value {
                Value::String(s) => Ok(s.to_str()?.to_string()),
                number @ (Value::Integer(_) | Value::Number(_)) => {
                    match lua.coerce_string(number)? {
                        Some(s) => Ok(s.to_str()?.to_string()),
                        None => Err("description: expected string, got number".to_string()),
                    }
                }
                other => Err(format!(
                    "description: expected string, got {}",
                    other.type_name()
                )),
            };
            slot.record(|capture| {
                capture.description = text?;
                Ok(())
            })
        })?
    };

    let sources = {
        let slot = slot.clone();
        lua.create_function(move |_, value: Value| {
            let (items, error) = string_list(value);
            slot.record(|capture| {
                capture.sources.extend(items);
                error.map_or(Ok(()), Err)
            })
        })?
    };

    let depends = {
        let slot = slot.clone();
        lua.create_function(move |_, args: Variadic<Value>| {
            let names = dependency_names(args);
            slot.record(|capture| {
                capture.dependencies.extend(names);
                Ok(())
            })
        })?
    };

    globals.set("description", description)?;
    globals.set("sources", sources)?;
    globals.set("depends", depends)?;
    globals.set("defer", lua.create_function(|_, _: MultiValue| Ok(()))?)?;
    Ok(())
}

/// Read a `sources { ... }` argument.
///
/// Keys must be integers and values strings. Integer-keyed elements are
/// walked in ascending key order and collected up to the first non-string
/// value; that prefix comes back together with the type error, if any.
fn string_list(value: Value) -> (Vec<String>, Option<String>) {
    let table = match value {
        Value::Table(table) => table,
        other => {
            let message = format!("sources: expected table, got {}", other.type_name());
            return (Vec::new(), Some(message));
        }
    };

    let mut indexed = Vec::new();
    let mut bad_key = false;
    for pair in table.pairs::<Value, Value>() {
        match pair {
            Ok((Value::Integer(index), value)) => indexed.push((index, value)),
            Ok(_) => bad_key = true,
            Err(err) => return (Vec::new(), Some(err.to_string())),
        }
    }
    indexed.sort_by_key(|(index, _)| *index);

    let mut items = Vec::new();
    for (_, value) in indexed {
        match value {
            Value::String(s) => match s.to_str() {
                Ok(item) => items.push(item.to_string()),
                Err(err) => return (items, Some(err.to_string())),
            },
            _ => {
                let message = "sources: all values must be of type string".to_string();
                return (items, Some(message));
            }
        }
    }

    if bad_key {
        let message = "sources: all keys must be of type number".to_string();
        return (items, Some(message));
    }
    (items, None)
}

/// Names passed to `depends`, either as varargs or as list tables.
///
/// Non-string values are skipped; nothing is resolved.
fn dependency_names(args: Variadic<Value>) -> Vec<String> {
    let mut names = Vec::new();

    for arg in args {
        match arg {
            Value::String(s) => {
                if let Ok(name) = s.to_str() {
                    names.push(name.to_string());
                }
            }
            Value::Table(table) => {
                for value in table.sequence_values::<Value>().flatten() {
                    if let Value::String(s) = value {
                        if let Ok(name) = s.to_str() {
                            names.push(name.to_string());
                        }
                    }
                }
            }
            _ => {}
        }
    }

    names
}
