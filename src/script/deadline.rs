// src/script/deadline.rs

//! Cooperative execution deadline for guest code.
//!
//! A VM hook runs every [`CHECK_EVERY`] instructions and raises an error once
//! the wall-clock budget is spent. The guard records that it fired, so callers
//! can tell a timeout apart from an ordinary guest error without inspecting
//! messages.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use mlua::{HookTriggers, Lua, VmState};
use tracing::trace;

/// Instructions between two deadline checks.
pub const CHECK_EVERY: u32 = 1_000;

/// Armed deadline on a Lua state. The hook is removed on drop.
pub struct DeadlineGuard<'lua> {
    lua: &'lua Lua,
    fired: Rc<Cell<bool>>,
}

impl<'lua> DeadlineGuard<'lua> {
    pub fn arm(lua: &'lua Lua, budget: Duration) -> Self {
        let fired = Rc::new(Cell::new(false));
        let expires_at = Instant::now() + budget;

        {
            let fired = Rc::clone(&fired);
            lua.set_hook(
                HookTriggers::new().every_nth_instruction(CHECK_EVERY),
                move |_, _| {
                    if fired.get() || Instant::now() >= expires_at {
                        fired.set(true);
                        return Err(mlua::Error::runtime(format!(
                            "execution deadline of {budget:?} exceeded"
                        )));
                    }
                    Ok(VmState::Continue)
                },
            );
        }

        trace!(?budget, "deadline armed");
        Self { lua, fired }
    }

    /// Whether the hook aborted guest execution.
    pub fn fired(&self) -> bool {
        self.fired.get()
    }
}

impl Drop for DeadlineGuard<'_> {
    fn drop(&mut self) {
        self.lua.remove_hook();
    }
}
