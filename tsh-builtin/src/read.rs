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

//! Read built-in
//!
//! The **`read`** built-in reads a line into variables.
//!
//! # Synopsis
//!
//! ```sh
//! read [-r] variable…
//! ```
//!
//! # Description
//!
//! The read built-in reads a line from the standard input and assigns it to
//! the variables named by the operands. Field splitting is performed on the
//! line to produce as many fields as there are variables. If there are fewer
//! fields than variables, the remaining variables are set to empty strings.
//! If there are more fields than variables, the last variable receives all
//! remaining fields, including the field separators, but not trailing
//! whitespace separators.
//!
//! ## Escaping
//!
//! By default, backslashes in the input are treated as quoting characters
//! that prevent the following character from being interpreted as a field
//! separator. Backslash-newline pairs are treated as line continuations. The
//! `-r` option disables this behavior.
//!
//! ## Signals
//!
//! While waiting for input, the built-in can be interrupted by a signal. If
//! the signal is `SIGINT` or has a trap command, the built-in runs the
//! pending traps and fails with the exit status that corresponds to the
//! signal. The variables are not assigned in that case. Other signals only
//! have their pending traps run before reading is resumed.
//!
//! # Errors
//!
//! It is an error if no operand is given, if an operand is not a valid
//! variable name, or if the standard input is not readable.
//!
//! # Exit status
//!
//! The exit status is zero if a line was read successfully and non-zero
//! otherwise. If the built-in reaches the end of the input before finding a
//! line, it returns 1, but the variables are still assigned empty values.
//! On interruption by a signal, the exit status is 128 plus the signal
//! number.

use crate::common::report::{report_error, report_failure};
use std::ops::ControlFlow::{Break, Continue};
use tsh_env::Env;
use tsh_env::semantics::{ExitStatus, Field};

pub mod assigning;
pub mod input;
pub mod syntax;

/// Abstract command line arguments of the `read` built-in
///
/// An instance of this struct is created by parsing command line arguments
/// using the [`syntax`] module.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Command {
    /// Whether the `-r` option is specified
    ///
    /// If this field is `true`, backslashes are not interpreted.
    pub is_raw: bool,

    /// Names of variables to be assigned, except the last one
    pub variables: Vec<Field>,

    /// Name of the last variable to be assigned
    ///
    /// The last variable receives all remaining fields, including the
    /// intermediate (but not trailing) field separators.
    pub last_variable: Field,
}

/// Entry point of the `read` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> crate::Result {
    let command = match syntax::parse(args) {
        Ok(command) => command,
        Err(error) => {
            let location = error.field().map(|field| field.origin.clone());
            return report_error(env, location.as_ref(), "read", &error);
        }
    };

    let input = match input::read(env, command.is_raw) {
        Continue(Ok(input)) => input,
        Continue(Err(input::Error::Interrupted(signal))) => {
            log::debug!("read interrupted by {signal}");
            return ExitStatus::from(signal).into();
        }
        Continue(Err(error)) => return report_failure(env, None, "read", &error),
        Break(divert) => {
            return crate::Result::with_exit_status_and_divert(env.exit_status, Some(divert));
        }
    };

    assigning::assign(env, &input.chars, command.variables, command.last_variable);
    if input.newline_found {
        ExitStatus::SUCCESS.into()
    } else {
        ExitStatus::FAILURE.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsh_env::signal::Number;
    use tsh_env::system::Disposition;
    use tsh_env::trap::Condition;
    use tsh_env_test_helper::{assert_stderr, assert_stdout};

    use crate::tests::env_with_builtins;

    #[test]
    fn reading_a_line() {
        let (mut env, system) = env_with_builtins();
        system.state.borrow_mut().stdin.push_back("  foo bar  baz ".to_string());
        let result = main(&mut env, Field::dummies(["a", "b"]));
        assert_eq!(result, crate::Result::new(ExitStatus::SUCCESS));
        assert_eq!(env.variables.get("a"), Some("foo"));
        assert_eq!(env.variables.get("b"), Some("bar  baz"));
    }

    #[test]
    fn end_of_input() {
        let (mut env, _) = env_with_builtins();
        env.variables.assign("a".to_string(), "old".to_string());
        let result = main(&mut env, Field::dummies(["a"]));
        assert_eq!(result, crate::Result::new(ExitStatus::FAILURE));
        assert_eq!(env.variables.get("a"), Some(""));
    }

    #[test]
    fn missing_operand() {
        let (mut env, system) = env_with_builtins();
        let result = main(&mut env, vec![]);
        assert_eq!(result, crate::Result::new(ExitStatus::ERROR));
        assert_stderr(&system.state, |stderr| {
            assert_eq!(stderr, "tsh: read: missing operand\n")
        });
    }

    #[test]
    fn interrupted_by_trapped_signal() {
        let (mut env, system) = env_with_builtins();
        let sys = env.system.clone();
        env.traps
            .set_trap(&*sys, Number::SIGINT.into(), "echo trapped".into(), None)
            .unwrap();
        system
            .state
            .borrow_mut()
            .signals_on_read
            .push_back(Number::SIGINT);

        let result = main(&mut env, Field::dummies(["a"]));
        assert_eq!(result, crate::Result::new(ExitStatus::from(Number::SIGINT)));
        assert_eq!(env.variables.get("a"), None);
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, "trapped\n"));
        assert!(!env.system.pending().set_interruptible(false));
        assert_eq!(env.unwind.depth(), 0);
        assert_eq!(system.disposition(Number::SIGINT), Disposition::Catch);
        assert!(env.traps.is_trapped(Condition::Signal(Number::SIGINT)));
    }
}
