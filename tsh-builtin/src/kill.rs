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

//! Kill built-in
//!
//! The **`kill`** built-in sends a signal to processes.
//!
//! # Synopsis
//!
//! ```sh
//! kill [-s signal|-signal] process…
//! ```
//!
//! ```sh
//! kill -l [exit_status…]
//! ```
//!
//! # Description
//!
//! Without the `-l` option, the built-in sends the signal to the processes
//! specified by the operands. The signal defaults to `SIGTERM`. A negative
//! operand denotes a process group. When a negative operand is the first
//! operand, it must be preceded by `--` so that it is not taken as a signal.
//!
//! With the `-l` option, the built-in prints signal names. Without operands,
//! all supported signals are listed, one per line. An operand that is a
//! number is taken as a signal number, or as the exit status of a process
//! killed by a signal if it exceeds 128, and the name of the signal is
//! printed. An operand that is a signal name is printed as its number.
//!
//! Signal names are case-insensitive and may have the `SIG` prefix.
//!
//! # Exit status
//!
//! Zero if the signal was sent to all the processes (or all the signals were
//! printed), one if any of them failed, and two on a syntax error.

use crate::common::report::{report_error, report_failure};
use crate::common::signal_list;
use std::str::FromStr;
use tsh_env::Env;
use tsh_env::semantics::{ExitStatus, Field};
use tsh_env::signal::{Number, RawNumber};
use tsh_env::system::Pid;
use tsh_env::trap::Condition;

pub mod syntax;

/// Parsed command line arguments
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Sends a signal to processes
    Send {
        /// Signal to send
        signal: Number,
        /// Target processes
        targets: Vec<Field>,
    },
    /// Prints signal names or numbers
    Print {
        /// Signals to print
        ///
        /// If empty, all signals are listed.
        operands: Vec<Field>,
    },
}

/// Parses a signal name or number.
///
/// Returns `None` for anything that does not name a signal, including the
/// `EXIT` condition.
#[must_use]
pub fn parse_signal(s: &str) -> Option<Number> {
    Condition::from_str(s).ok()?.signal()
}

fn print_operand(operand: &str) -> Option<String> {
    if let Ok(mut raw) = operand.parse::<RawNumber>() {
        if raw > 0x80 {
            raw -= 0x80;
        }
        let name = Number::from_raw(raw)?.name()?;
        return Some(format!("{name}\n"));
    }
    parse_signal(operand).map(|number| format!("{}\n", number.as_raw()))
}

fn print(env: &mut Env, operands: &[Field]) -> crate::Result {
    if operands.is_empty() {
        env.print(&signal_list());
        return crate::Result::default();
    }

    let mut exit_status = ExitStatus::SUCCESS;
    for operand in operands {
        match print_operand(&operand.value) {
            Some(line) => env.print(&line),
            None => {
                let message = format!("`{}` is not a valid signal", operand.value);
                exit_status =
                    report_failure(env, Some(&operand.origin), "kill", message).exit_status();
            }
        }
    }
    exit_status.into()
}

fn send(env: &mut Env, signal: Number, targets: &[Field]) -> crate::Result {
    let mut exit_status = ExitStatus::SUCCESS;
    for target in targets {
        let message = match target.value.parse() {
            Ok(pid) => match env.system.kill(Pid::from_raw(pid), signal) {
                Ok(()) => {
                    log::debug!("sent {signal} to {pid}");
                    continue;
                }
                Err(errno) => format!("{}: {errno}", target.value),
            },
            Err(_) => format!("`{}` is not a valid process ID", target.value),
        };
        exit_status = report_failure(env, Some(&target.origin), "kill", message).exit_status();
    }
    exit_status.into()
}

impl Command {
    /// Executes the built-in.
    pub fn execute(&self, env: &mut Env) -> crate::Result {
        match self {
            Command::Send { signal, targets } => send(env, *signal, targets),
            Command::Print { operands } => print(env, operands),
        }
    }
}

/// Entry point of the kill built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> crate::Result {
    match syntax::parse(args) {
        Ok(command) => command.execute(env),
        Err(error) => {
            let location = error.field().map(|field| field.origin.clone());
            report_error(env, location.as_ref(), "kill", &error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::env_with_builtins;
    use tsh_env_test_helper::{assert_stderr, assert_stdout};
    use tsh_env::system::System;

    #[test]
    fn sending_default_signal() {
        let (mut env, system) = env_with_builtins();
        let result = main(&mut env, Field::dummies(["10", "-20"]));
        assert_eq!(result, crate::Result::default());
        assert_eq!(
            system.state.borrow().sent,
            [
                (Pid::from_raw(10), Number::SIGTERM),
                (Pid::from_raw(-20), Number::SIGTERM),
            ]
        );
    }

    #[test]
    fn sending_to_self_is_caught() {
        let (mut env, system) = env_with_builtins();
        let sys = env.system.clone();
        env.traps
            .set_trap(&*sys, Number::SIGUSR1.into(), "echo".into(), None)
            .unwrap();
        let result = main(&mut env, Field::dummies(["-s", "usr1", "2"]));
        assert_eq!(result, crate::Result::default());
        assert_eq!(system.pending().count(Number::SIGUSR1), 1);
    }

    #[test]
    fn invalid_target() {
        let (mut env, system) = env_with_builtins();
        let result = main(&mut env, Field::dummies(["-HUP", "x", "3"]));
        assert_eq!(result, crate::Result::new(ExitStatus::FAILURE));
        assert_eq!(system.state.borrow().sent, [(Pid::from_raw(3), Number::SIGHUP)]);
        assert_stderr(&system.state, |stderr| {
            assert_eq!(stderr, "tsh: <?>:1: kill: `x` is not a valid process ID\n")
        });
    }

    #[test]
    fn listing_signals() {
        let (mut env, system) = env_with_builtins();
        let result = main(&mut env, Field::dummies(["-l"]));
        assert_eq!(result, crate::Result::default());
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, signal_list()));
    }

    #[test]
    fn printing_operands() {
        let (mut env, system) = env_with_builtins();
        let status = ExitStatus::from(Number::SIGINT).to_string();
        let result = main(&mut env, Field::dummies(["-l", status.as_str(), "TERM", "9"]));
        assert_eq!(result, crate::Result::default());
        let expected = format!("INT\n{}\nKILL\n", Number::SIGTERM.as_raw());
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, expected));
    }
}
