// This file is part of tsh, a POSIX shell signal-trap engine.
// Copyright (C) 2026 The tsh authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Running the DEBUG, ERR and RETURN traps

use super::run_trap;
use crate::{Divert, ExitStatus, Result};
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;
use tsh_env::Env;
use tsh_env::option::{Debugger, ErrTrace, FuncTrace};
use tsh_env::trap::Condition;
use tsh_env::unwind::UnwindGuard;

/// Runs the DEBUG trap before a simple command.
///
/// The trap does not run inside itself, nor inside a function unless the
/// `functrace` option is on. Exited children are not recorded in the job
/// list while the trap runs.
///
/// Returns `Continue(true)` if the command should be executed. When the
/// `debugger` option is on, the exit status of the trap action controls the
/// command:
///
/// - 1 skips the command;
/// - 2 inside a function or dot script returns from it with exit status 2.
pub fn run_debug_trap(env: &mut Env) -> Result<bool> {
    let cond = Condition::Debug;
    let Some(command) = env.traps.command(cond) else {
        return Continue(true);
    };
    if env.stack.in_trap(cond) || !env.trap_guard.can_enter() {
        return Continue(true);
    }
    if env.stack.in_function() && !env.options.is_on(FuncTrace) {
        return Continue(true);
    }

    let origin = env.traps.origin(cond).cloned();
    let mut guard = env.begin_frame("DEBUG trap");
    guard.jobs.freeze();
    guard.protect(|env| env.jobs.thaw());
    let exit_status = run_trap(&mut guard, cond, command, origin)?;
    UnwindGuard::run(guard);

    if !env.options.is_on(Debugger) {
        return Continue(true);
    }
    match exit_status {
        ExitStatus(2) if env.stack.can_return() => {
            log::debug!("DEBUG trap forces return");
            Break(Divert::Return(Some(ExitStatus(2))))
        }
        ExitStatus::FAILURE => Continue(false),
        _ => Continue(true),
    }
}

/// Runs the ERR trap after a command has failed.
///
/// The trap does not run inside itself, nor inside a function unless the
/// `errtrace` option is on.
pub fn run_err_trap(env: &mut Env) -> Result {
    let cond = Condition::Err;
    let Some(command) = env.traps.command(cond) else {
        return Continue(());
    };
    if env.stack.in_trap(cond) || !env.trap_guard.can_enter() {
        return Continue(());
    }
    if env.stack.in_function() && !env.options.is_on(ErrTrace) {
        return Continue(());
    }

    let origin = env.traps.origin(cond).cloned();
    run_trap(env, cond, command, origin)?;
    Continue(())
}

/// What has just finished when [`run_return_trap`] is called
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReturnKind {
    /// Function call
    Function {
        /// RETURN trap action that was set when the function was called
        trap_at_entry: Option<Rc<str>>,
    },
    /// Dot script
    DotScript,
}

/// Runs the RETURN trap after a function or dot script has finished.
///
/// After a dot script, the trap always runs. After a function, the trap runs
/// only if the `functrace` option is on or the trap was set while the
/// function was running.
pub fn run_return_trap(env: &mut Env, kind: ReturnKind) -> Result {
    let cond = Condition::Return;
    let Some(command) = env.traps.command(cond) else {
        return Continue(());
    };
    if env.stack.in_trap(cond) || !env.trap_guard.can_enter() {
        return Continue(());
    }
    if let ReturnKind::Function { trap_at_entry } = kind {
        let inherited = trap_at_entry.is_some_and(|entry| Rc::ptr_eq(&entry, &command));
        if inherited && !env.options.is_on(FuncTrace) {
            return Continue(());
        }
    }

    let origin = env.traps.origin(cond).cloned();
    run_trap(env, cond, command, origin)?;
    Continue(())
}
