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

//! Running traps
//!
//! Traps for signals are not run when the signals are caught. The signal
//! handler only counts them in the [`PendingTrapQueue`](tsh_env::pending::PendingTrapQueue),
//! and [`run_pending_traps`] runs the trap actions at the next safe point.
//! The other conditions have dedicated runners: [`run_exit_trap`],
//! [`run_debug_trap`], [`run_err_trap`] and [`run_return_trap`].
//!
//! All of them execute the action with [`run_trap`], which isolates the
//! action from the command it interrupts.

mod exit;
mod hook;
mod signal;

pub use self::exit::run_exit_trap;
pub use self::hook::{ReturnKind, run_debug_trap, run_err_trap, run_return_trap};
pub use self::signal::run_pending_traps;

use crate::runner::{EvalFlags, evaluate};
use crate::{ExitStatus, Result};
use std::ops::ControlFlow::Continue;
use std::rc::Rc;
use tsh_env::Env;
use tsh_env::stack::Frame;
use tsh_env::trap::Condition;
use tsh_env::unwind::UnwindGuard;
use tsh_syntax::source::{Location, Source};

/// Runs a trap action.
///
/// The action is parsed and executed as a separate piece of code, so the
/// parser of the interrupted code is not affected. While the action runs,
/// the environment has:
///
/// - a [`Frame::Trap`] on the stack;
/// - the trap slot marked as running, so a replacement of the action leaves
///   the running text intact;
/// - one more level in the [`RecursionGuard`](tsh_env::trap::RecursionGuard);
/// - no temporary assignments of the interrupted command.
///
/// When the action finishes, by any means, `$?`, the pipeline status and the
/// temporary assignments are restored. On success, this function returns
/// the exit status of the action. A divert raised in the action is returned
/// after the restoration.
///
/// The caller is responsible for checking that the recursion ceiling allows
/// another trap.
pub fn run_trap(
    env: &mut Env,
    cond: Condition,
    command: Rc<str>,
    origin: Option<Location>,
) -> Result<ExitStatus> {
    let previous_exit_status = env.exit_status;
    let pipe_status = std::mem::take(&mut env.pipe_status);
    let temp_env = std::mem::take(&mut env.temp_env);
    let previous_trap = env.trap_guard.enter(cond);
    env.traps.begin_running(cond);

    let mut env = env.push_frame(Frame::Trap {
        condition: cond,
        previous_exit_status,
    });
    let mut env = env.begin_frame("trap");
    env.protect(move |env| {
        env.exit_status = previous_exit_status;
        env.pipe_status = pipe_status;
        env.temp_env = temp_env;
        env.traps.finish_running(cond);
        env.trap_guard.leave(previous_trap);
    });

    log::debug!("running trap for {cond}: {command}");
    let condition = cond.to_string();
    let source = Rc::new(Source::Trap { condition, origin });
    let flags = EvalFlags::TRAP | EvalFlags::NO_HISTORY | EvalFlags::RESET_LINE;
    let result = evaluate(&mut env, &command, source, flags);
    let exit_status = env.exit_status;
    UnwindGuard::run(env);
    result?;
    Continue(exit_status)
}
