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

//! Trap built-in
//!
//! The **`trap`** built-in sets or prints traps.
//!
//! # Synopsis
//!
//! ```sh
//! trap [action] condition…
//! ```
//!
//! ```sh
//! trap [-p [condition…]]
//! ```
//!
//! ```sh
//! trap -l
//! ```
//!
//! # Description
//!
//! The trap built-in can be used to either set or print traps. To set traps,
//! pass an *action* and one or more *condition*s as operands. To print the
//! currently configured traps, invoke the built-in with no operands or with
//! the `-p` option.
//!
//! ## Setting traps
//!
//! When setting traps, the built-in sets the *action* for each *condition*
//! in the current shell environment. The action is one of:
//!
//! - `-` to reset the condition to its default action
//! - an empty string to ignore the condition
//! - any other string to run it as a command when the condition is met
//!
//! If the first operand is an unsigned integer, the action is omitted and all
//! operands are conditions to be reset to the default action.
//!
//! ## Printing traps
//!
//! Without operands, the built-in prints the conditions that have a
//! non-default action as commands that would restore them. In a subshell,
//! the traps of the parent shell are printed until the subshell sets its
//! own. With the `-p` option, conditions with the default action are
//! printed as well. Operands given with `-p` limit the output to the
//! conditions.
//!
//! ## Listing signals
//!
//! The `-l` option prints the names of all supported signals.
//!
//! # Options
//!
//! - **`-l`**, **`--list`**: List the signal names.
//! - **`-p`**, **`--print`**: Print the traps.
//!
//! # Operands
//!
//! A condition is a signal name (with or without the `SIG` prefix,
//! case-insensitive), a signal number, `EXIT` (or `0`), `DEBUG`, `ERR` or
//! `RETURN`.
//!
//! # Errors
//!
//! Traps cannot be set for `SIGKILL` or `SIGSTOP`. Trying to change a signal
//! that was ignored on entry to a non-interactive shell silently does
//! nothing.
//!
//! An unknown condition is an error.
//!
//! # Exit status
//!
//! Zero if successful, one if a trap could not be set or a condition is
//! unknown, and two on a syntax error.

use crate::common::report::{report, report_failure};
use crate::common::signal_list;
use crate::common::syntax::parse_arguments;
use std::fmt::Write;
use std::rc::Rc;
use tsh_env::Env;
use tsh_env::semantics::{ExitStatus, Field};
use tsh_env::trap::{Action, Condition, SetActionError, SlotState};
use tsh_syntax::source::Location;
use yash_quote::quote;

pub mod syntax;

/// Interpretation of command line arguments of the trap built-in
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Print all traps
    PrintAll {
        /// Whether to print conditions with the default action
        include_default: bool,
    },

    /// Print traps for the specified conditions
    Print { conditions: Vec<(Condition, Field)> },

    /// Set an action for one or more conditions
    SetAction {
        action: Action,
        conditions: Vec<(Condition, Field)>,
        /// Location of the first operand
        origin: Location,
    },

    /// List the supported signals
    ListSignals,
}

/// Returns the action to be printed for the slot.
///
/// In a subshell, a condition that has not been set since entering the
/// subshell reports the action of the parent.
fn displayed_action(env: &Env, state: Option<&SlotState>) -> Action {
    let Some(state) = state else {
        return Action::Default;
    };
    match (&state.action, &state.parent_action) {
        (Action::Default, Some(parent @ Action::Command(_))) if env.stack.in_subshell() => {
            parent.clone()
        }
        (action, _) => action.clone(),
    }
}

fn display_trap(
    output: &mut String,
    cond: Condition,
    action: &Action,
    include_default: bool,
) {
    let command = match action {
        Action::Default if include_default => "-".into(),
        Action::Default => return,
        Action::Ignore => quote(""),
        Action::Command(command) => quote(command),
    };
    writeln!(output, "trap -- {command} {cond}").ok();
}

fn print_all(env: &mut Env, include_default: bool) -> crate::Result {
    let mut output = String::new();
    for (&cond, state) in env.traps.iter() {
        let action = displayed_action(env, Some(state));
        display_trap(&mut output, cond, &action, include_default);
    }
    env.print(&output);
    crate::Result::default()
}

fn print(env: &mut Env, conditions: &[(Condition, Field)]) -> crate::Result {
    let mut output = String::new();
    for &(cond, _) in conditions {
        let action = displayed_action(env, env.traps.get_state(cond));
        display_trap(&mut output, cond, &action, true);
    }
    env.print(&output);
    crate::Result::default()
}

fn set_action(
    env: &mut Env,
    action: &Action,
    conditions: &[(Condition, Field)],
    origin: &Location,
) -> crate::Result {
    let system = Rc::clone(&env.system);
    let mut exit_status = ExitStatus::SUCCESS;
    for (cond, field) in conditions {
        let origin = Some(origin.clone());
        let result = match action {
            Action::Default => env.traps.revert_trap(&*system, *cond, origin),
            Action::Ignore => env.traps.ignore_trap(&*system, *cond, origin),
            Action::Command(command) => {
                env.traps
                    .set_trap(&*system, *cond, Rc::clone(command), origin)
            }
        };
        match result {
            Ok(()) => (),
            Err(SetActionError::InitiallyIgnored) => {
                log::debug!("trap for {cond} not changed: ignored since startup");
            }
            Err(error) => {
                let message = format!("{cond}: {error}");
                let result = report_failure(env, Some(&field.origin), "trap", message);
                exit_status = result.exit_status();
            }
        }
    }
    exit_status.into()
}

impl Command {
    /// Executes the trap built-in.
    pub fn execute(&self, env: &mut Env) -> crate::Result {
        match self {
            Command::PrintAll { include_default } => print_all(env, *include_default),
            Command::Print { conditions } => print(env, conditions),
            Command::SetAction {
                action,
                conditions,
                origin,
            } => set_action(env, action, conditions, origin),
            Command::ListSignals => {
                env.print(&signal_list());
                crate::Result::default()
            }
        }
    }
}

/// Entry point of the trap built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> crate::Result {
    let (options, operands) = match parse_arguments(syntax::OPTION_SPECS, args) {
        Ok(result) => result,
        Err(error) => {
            let location = error.field().origin.clone();
            return report(env, Some(&location), "trap", &error, ExitStatus::ERROR);
        }
    };

    match syntax::interpret(options, operands) {
        Ok(command) => command.execute(env),
        Err(errors) => {
            let mut result = crate::Result::default();
            for error in errors {
                let exit_status = match error {
                    syntax::Error::UnknownCondition(_) => ExitStatus::FAILURE,
                    syntax::Error::MissingCondition { .. } => ExitStatus::ERROR,
                };
                let location = error.field().origin.clone();
                result = report(env, Some(&location), "trap", &error, exit_status);
            }
            result
        }
    }
}
