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

//! Running traps for caught signals

use super::run_trap;
use crate::{Divert, ExitStatus, Result};
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;
use tsh_env::Env;
use tsh_env::pending::PendingTrapQueue;
use tsh_env::signal::Number;
use tsh_env::system::System;
use tsh_env::trap::{Action, Condition, SignalMode};
use tsh_env::unwind::UnwindGuard;

fn redeliver(env: &mut Env, system: &dyn System, signal: Number) {
    if let Err(errno) = env.traps.redeliver(system, signal) {
        log::warn!("cannot re-deliver signal {signal}: {errno}");
    }
}

/// Handles an ordinary signal.
fn dispatch(env: &mut Env, system: &dyn System, signal: Number) -> Result {
    let cond = Condition::from(signal);
    let pending = system.pending();
    let Some(command) = env.traps.command(cond) else {
        pending.take(signal);
        redeliver(env, system, signal);
        return Continue(());
    };

    if !env.trap_guard.can_enter() {
        log::debug!("trap for {cond} deferred: recursion ceiling reached");
        return Continue(());
    }
    let count = pending.take(signal);
    log::trace!("signal {signal} caught {count} time(s)");
    let origin = env.traps.origin(cond).cloned();
    run_trap(env, cond, command, origin)?;
    Continue(())
}

/// Handles `SIGINT`.
///
/// Without a trap, an interactive shell abandons the current command.
fn dispatch_interrupt(env: &mut Env, system: &dyn System) -> Result {
    let signal = Number::SIGINT;
    let cond = Condition::from(signal);
    let pending = system.pending();

    let result = match env.traps.get_action(cond) {
        Action::Command(command) => {
            if !env.trap_guard.can_enter() {
                log::debug!("trap for {cond} deferred: recursion ceiling reached");
                return Continue(());
            }
            pending.take(signal);
            let origin = env.traps.origin(cond).cloned();
            match run_trap(env, cond, command, origin) {
                Continue(_) => Continue(()),
                Break(divert) => Break(divert),
            }
        }
        Action::Default
            if env.is_interactive() && env.traps.mode(cond).contains(SignalMode::SPECIAL) =>
        {
            pending.take(signal);
            log::debug!("interrupted");
            Break(Divert::Discard(Some(ExitStatus::from(signal))))
        }
        Action::Default | Action::Ignore => {
            pending.take(signal);
            redeliver(env, system, signal);
            Continue(())
        }
    };
    pending.clear_interrupt();
    result
}

/// Handles `SIGCHLD`.
///
/// Children are reaped once per caught `SIGCHLD`, each followed by the trap
/// action if one is set. The trap for `SIGCHLD` never runs recursively.
fn dispatch_child(env: &mut Env, system: &dyn System) -> Result {
    let cond = Condition::from(Number::SIGCHLD);
    if env.traps.mode(cond).contains(SignalMode::INPROGRESS) {
        return Continue(());
    }

    let count = system.pending().take(Number::SIGCHLD);
    let mut env = env.begin_frame("SIGCHLD");
    env.traps.begin_running(cond);
    env.protect(move |env| env.traps.finish_running(cond));

    for _ in 0..count {
        env.reap_exited_children();
        let Some(command) = env.traps.command(cond) else {
            continue;
        };
        if !env.trap_guard.can_enter() {
            log::debug!("trap for {cond} skipped: recursion ceiling reached");
            continue;
        }
        let origin = env.traps.origin(cond).cloned();
        run_trap(&mut env, cond, command, origin)?;
    }

    UnwindGuard::run(env);
    Continue(())
}

fn dispatch_all(env: &mut Env, system: &dyn System, pending: &PendingTrapQueue) -> Result {
    for signal in pending.signals() {
        if signal == Number::SIGINT {
            dispatch_interrupt(env, system)?;
        } else if signal == Number::SIGCHLD {
            dispatch_child(env, system)?;
        } else {
            dispatch(env, system, signal)?;
        }
    }
    Continue(())
}

/// Runs traps for signals that have been caught.
///
/// This function should be called at safe points, where arbitrary shell code
/// may run. If no signal has been caught since the last call, this function
/// returns immediately.
///
/// Signals are handled in ascending order of their numbers. Multiple
/// deliveries of one signal run its trap once, except for `SIGCHLD`. A
/// signal whose trap has been reset since it was caught is raised again so
/// that its original disposition takes effect. A trap that would exceed the
/// recursion ceiling is left pending until a later call.
///
/// `$?` and the pipeline status are restored after the traps have run. If a
/// trap action raises a divert, the remaining signals are left pending and
/// the divert is returned after the restoration.
pub fn run_pending_traps(env: &mut Env) -> Result {
    let system = Rc::clone(&env.system);
    let pending = system.pending();
    if !pending.take_work() {
        return Continue(());
    }

    let previous_exit_status = env.exit_status;
    let pipe_status = env.pipe_status.clone();
    let mut env = env.begin_frame("pending traps");
    env.protect(move |env| {
        env.exit_status = previous_exit_status;
        env.pipe_status = pipe_status;
    });

    let result = dispatch_all(&mut env, &*system, pending);
    pending.rearm();
    UnwindGuard::run(env);
    result
}
