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

//! This crate defines the shell execution environment and the signal-trap
//! state of tsh.
//!
//! A shell execution environment, [`Env`], is a collection of data that may
//! affect or be affected by the execution of commands. Most parts of the
//! environment are implemented in pure Rust in this crate. Signal dispositions,
//! the signal mask and I/O, on the other hand, are managed by the operating
//! system and accessed through the [`System`](system::System) trait.
//! [`RealSystem`](system::real::RealSystem) performs actual system calls while
//! [`VirtualSystem`](system::r#virtual::VirtualSystem) simulates them for
//! testing.
//!
//! The [`trap`] module manages user-defined traps and the shell's internal
//! signal handlers. Caught signals are counted in the
//! [`PendingTrapQueue`](pending::PendingTrapQueue) until the shell reaches a
//! point where it can safely run the trap commands.

pub mod builtin;
pub mod function;
pub mod input;
pub mod io;
pub mod job;
pub mod limits;
pub mod option;
pub mod pending;
pub mod semantics;
pub mod signal;
pub mod stack;
pub mod system;
pub mod trap;
pub mod unwind;
pub mod variable;

use self::builtin::Builtin;
use self::function::FunctionSet;
use self::job::JobList;
use self::limits::Limits;
use self::option::OptionSet;
use self::option::{ErrTrace, FuncTrace, Interactive, Monitor};
use self::semantics::ExitStatus;
use self::stack::{Frame, Stack};
use self::system::r#virtual::VirtualSystem;
use self::system::{Errno, SharedSystem};
use self::trap::{RecursionGuard, TrapSet};
use self::unwind::UnwindStack;
use self::variable::VariableSet;
use std::collections::HashMap;
use std::rc::Rc;

/// Whole shell execution environment.
#[derive(Debug)]
pub struct Env {
    /// Built-in utilities available in the environment.
    pub builtins: HashMap<&'static str, Builtin>,

    /// Exit status of the last executed command.
    pub exit_status: ExitStatus,

    /// Exit statuses of the commands of the last executed pipeline.
    ///
    /// Since the minimal executor runs no pipelines, this always has one
    /// element after a simple command.
    pub pipe_status: Vec<ExitStatus>,

    /// Functions defined in the environment.
    pub functions: FunctionSet,

    /// Exited child processes.
    pub jobs: JobList,

    /// Variables and positional parameters defined in the environment.
    pub variables: VariableSet,

    /// Assignments prefixed to the command being executed.
    ///
    /// These are visible to parameter expansion while the command runs and
    /// are hidden from traps that interrupt it.
    pub temp_env: Vec<(String, String)>,

    /// Shell option settings.
    pub options: OptionSet,

    /// Bounds on nesting.
    pub limits: Limits,

    /// Runtime execution context stack.
    pub stack: Stack,

    /// Traps defined in the environment.
    pub traps: TrapSet,

    /// Depth of nested trap runs.
    pub trap_guard: RecursionGuard,

    /// Cleanup actions of operations in progress.
    pub unwind: UnwindStack,

    /// Line number of the command being executed.
    pub line_number: u64,

    /// Depth of nested evaluations.
    pub eval_depth: usize,

    /// Number of function calls and dot scripts that catch `return` in the
    /// current environment.
    pub return_catch_depth: usize,

    /// Command lines entered interactively.
    pub history: Vec<String>,

    /// Name of the shell or script, the value of `$0`.
    pub arg0: String,

    /// Interface to the system-managed parts of the environment.
    pub system: SharedSystem,
}

impl Env {
    /// Creates a new environment with the given system.
    ///
    /// Members of the new environments are default-constructed except that:
    /// - `arg0` is initialized as `"tsh"`;
    /// - `trap_guard` uses the ceiling of `limits`.
    #[must_use]
    pub fn with_system(system: SharedSystem) -> Env {
        let limits = Limits::default();
        Env {
            builtins: Default::default(),
            exit_status: Default::default(),
            pipe_status: Default::default(),
            functions: Default::default(),
            jobs: Default::default(),
            variables: Default::default(),
            temp_env: Default::default(),
            options: Default::default(),
            limits,
            stack: Default::default(),
            traps: Default::default(),
            trap_guard: RecursionGuard::new(limits.trap_recursion_ceiling),
            unwind: Default::default(),
            line_number: 0,
            eval_depth: 0,
            return_catch_depth: 0,
            history: Default::default(),
            arg0: io::SHELL_NAME.to_string(),
            system,
        }
    }

    /// Creates a new environment with a [`VirtualSystem`].
    #[must_use]
    pub fn new_virtual() -> Env {
        Env::with_system(Rc::new(VirtualSystem::new()))
    }

    /// Changes the limits, updating the trap recursion guard.
    pub fn set_limits(&mut self, limits: Limits) {
        self.limits = limits;
        self.trap_guard.set_ceiling(limits.trap_recursion_ceiling);
    }

    /// Whether the shell is interactive.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.options.is_on(Interactive)
    }

    /// Returns the value of the variable, looking in `temp_env` first.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.temp_env
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
            .or_else(|| self.variables.get(name))
    }

    /// Installs the signal handlers the shell needs for itself.
    ///
    /// This function should be called once at startup after the options have
    /// been set. An interactive shell catches `SIGINT` and ignores `SIGQUIT`
    /// and `SIGTERM`. With the `monitor` option, the shell also ignores the
    /// job-control stop signals and catches `SIGCHLD`.
    pub fn install_internal_handlers(&mut self) -> Result<(), Errno> {
        let interactive = self.is_interactive();
        let monitor = self.options.is_on(Monitor);
        let system = Rc::clone(&self.system);
        self.traps.set_override_ignore(interactive);
        self.traps
            .enable_special_handlers(&*system, interactive, monitor)?;
        if interactive {
            self.traps.enable_interrupt_handler(&*system)?;
        }
        if monitor {
            self.traps.enable_sigchld_handler(&*system)?;
        }
        Ok(())
    }

    /// Turns this environment into that of a subshell.
    ///
    /// Traps are reset as described in [`TrapSet::enter_subshell`], pending
    /// signals are forgotten, the job list is cleared and a
    /// [`Frame::Subshell`] is pushed permanently.
    pub fn enter_subshell(&mut self) -> Result<(), Errno> {
        let system = Rc::clone(&self.system);
        let keep_debug_return = self.options.is_on(FuncTrace);
        let keep_err = self.options.is_on(ErrTrace);
        self.traps
            .enter_subshell(&*system, keep_debug_return, keep_err)?;
        system.pending().clear();
        self.jobs.reset();
        self.push_permanent_frame(Frame::Subshell);
        log::debug!("entered subshell");
        Ok(())
    }

    /// Reaps child processes that have terminated.
    ///
    /// Each reaped child is recorded in the job list. Returns the number of
    /// children reaped.
    pub fn reap_exited_children(&mut self) -> usize {
        let mut count = 0;
        loop {
            match self.system.wait_any() {
                Ok(Some((pid, exit_status))) => {
                    log::debug!("child {pid} exited with {exit_status}");
                    self.jobs.record_exit(pid, exit_status);
                    count += 1;
                }
                Ok(None) | Err(Errno::ECHILD) => break,
                Err(Errno::EINTR) => continue,
                Err(errno) => {
                    log::warn!("cannot reap child processes: {errno}");
                    break;
                }
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Number;
    use crate::system::{Disposition, Pid};
    use crate::trap::Action;

    fn env_with(system: &VirtualSystem) -> Env {
        Env::with_system(Rc::new(system.clone()))
    }

    #[test]
    fn lookup_prefers_temp_env() {
        let mut env = Env::new_virtual();
        env.variables.assign("X".to_string(), "1".to_string());
        assert_eq!(env.lookup("X"), Some("1"));
        env.temp_env.push(("X".to_string(), "2".to_string()));
        assert_eq!(env.lookup("X"), Some("2"));
        env.temp_env.clear();
        assert_eq!(env.lookup("X"), Some("1"));
    }

    #[test]
    fn interactive_handlers() {
        let system = VirtualSystem::new();
        let mut env = env_with(&system);
        env.options.set(Interactive, option::On);
        env.install_internal_handlers().unwrap();
        assert_eq!(system.disposition(Number::SIGINT), Disposition::Catch);
        assert_eq!(system.disposition(Number::SIGTERM), Disposition::Ignore);
        assert_eq!(system.disposition(Number::SIGCHLD), Disposition::Default);
    }

    #[test]
    fn entering_subshell() {
        let system = VirtualSystem::new();
        let mut env = env_with(&system);
        let system_ref = Rc::clone(&env.system);
        env.traps
            .set_trap(&*system_ref, Number::SIGUSR1.into(), "echo".into(), None)
            .unwrap();
        system.raise_signal(Number::SIGUSR1);
        env.jobs.record_exit(Pid::from_raw(5), ExitStatus(0));

        env.enter_subshell().unwrap();
        assert_eq!(env.traps.get_action(Number::SIGUSR1.into()), Action::Default);
        assert!(!env.system.pending().has_work());
        assert!(env.jobs.snapshot().is_empty());
        assert!(env.stack.in_subshell());
    }

    #[test]
    fn reaping_children() {
        let system = VirtualSystem::new();
        let mut env = env_with(&system);
        {
            let mut state = system.state.borrow_mut();
            state.exited_children.push_back((Pid::from_raw(3), ExitStatus(1)));
            state.exited_children.push_back((Pid::from_raw(4), ExitStatus(0)));
        }
        assert_eq!(env.reap_exited_children(), 2);
        assert_eq!(env.reap_exited_children(), 0);
        assert_eq!(
            env.jobs.snapshot(),
            [
                (Pid::from_raw(3), ExitStatus(1)),
                (Pid::from_raw(4), ExitStatus(0))
            ]
        );
    }
}
