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

//! Exit built-in
//!
//! The **`exit`** built-in causes the currently executing shell to exit.
//!
//! # Synopsis
//!
//! ```sh
//! exit [exit_status]
//! ```
//!
//! # Semantics
//!
//! `exit exit_status` makes the shell exit with the specified exit status.
//! The shell executes the EXIT trap, if any, before exiting, except when the
//! built-in is invoked in the EXIT trap itself. An `exit` in the EXIT trap
//! with an operand overrides the exit status of the shell.
//!
//! # Operands
//!
//! The optional ***exit_status*** operand, if given, should be a non-negative
//! decimal integer.
//!
//! # Exit status
//!
//! If the operand is not given, the shell exits with the current exit status
//! (`$?`). If the built-in is invoked in a trap, the exit status is the value
//! of `$?` before entering the trap.
//!
//! # Errors
//!
//! An invalid operand or more than one operand is an error. An error message
//! is printed, the exit status is 2 and the shell does not exit.
//!
//! # Implementation notes
//!
//! The built-in does not exit the process itself but returns a
//! [`Divert::ExitFromBuiltin`]. The divert contains the exit status only if
//! the operand is given. The evaluator catching the divert decides whether
//! the EXIT trap runs in the scope of the current function.

use crate::Result;
use crate::common::parse_exit_status;
use crate::common::report::report_error;
use crate::common::syntax::parse_arguments;
use tsh_env::Env;
use tsh_env::semantics::{Divert, ExitStatus, Field};

/// Entry point for executing the `exit` built-in
///
/// See the [module-level documentation](self) for details.
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operands = match parse_arguments(&[], args) {
        Ok((_, operands)) => operands,
        Err(error) => return report_error(env, Some(&error.field().origin), "exit", &error),
    };

    if let Some(extra) = operands.get(1) {
        return report_error(env, Some(&extra.origin), "exit", "too many operands");
    }

    let exit_status = match operands.first() {
        None => None,
        Some(operand) => match parse_exit_status(&operand.value) {
            Some(exit_status) => Some(exit_status),
            None => {
                let message = format!("`{}` is not a valid exit status", operand.value);
                return report_error(env, Some(&operand.origin), "exit", message);
            }
        },
    };

    let status = exit_status.unwrap_or_else(|| default_exit_status(env));
    log::debug!("exit built-in: {status}");
    Result::with_exit_status_and_divert(status, Some(Divert::ExitFromBuiltin(exit_status)))
}

/// Returns `$?`, or its value before the current trap.
fn default_exit_status(env: &Env) -> ExitStatus {
    match env.stack.current_trap() {
        Some((_, previous_exit_status)) => previous_exit_status,
        None => env.exit_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsh_env::stack::Frame;
    use tsh_env::trap::Condition;
    use tsh_env_test_helper::{assert_stderr, virtual_env};

    #[test]
    fn exit_without_operand() {
        let (mut env, _) = virtual_env();
        env.exit_status = ExitStatus(42);
        let result = main(&mut env, vec![]);
        assert_eq!(
            result,
            Result::with_exit_status_and_divert(
                ExitStatus(42),
                Some(Divert::ExitFromBuiltin(None))
            )
        );
    }

    #[test]
    fn exit_with_operand() {
        let (mut env, _) = virtual_env();
        let result = main(&mut env, Field::dummies(["3"]));
        assert_eq!(
            result,
            Result::with_exit_status_and_divert(
                ExitStatus(3),
                Some(Divert::ExitFromBuiltin(Some(ExitStatus(3))))
            )
        );
    }

    #[test]
    fn exit_with_separator() {
        let (mut env, _) = virtual_env();
        let result = main(&mut env, Field::dummies(["--", "5"]));
        assert_eq!(result.divert(), Some(Divert::ExitFromBuiltin(Some(ExitStatus(5)))));
    }

    #[test]
    fn exit_in_trap_uses_status_before_trap() {
        let (mut env, _) = virtual_env();
        env.exit_status = ExitStatus(9);
        let mut env = env.push_frame(Frame::Trap {
            condition: Condition::Exit,
            previous_exit_status: ExitStatus(4),
        });
        let result = main(&mut env, vec![]);
        assert_eq!(result.exit_status(), ExitStatus(4));
        assert_eq!(result.divert(), Some(Divert::ExitFromBuiltin(None)));
    }

    #[test]
    fn invalid_operand() {
        let (mut env, system) = virtual_env();
        let result = main(&mut env, Field::dummies(["x"]));
        assert_eq!(result, Result::new(ExitStatus::ERROR));
        assert_stderr(&system.state, |stderr| {
            assert_eq!(stderr, "tsh: <?>:1: exit: `x` is not a valid exit status\n")
        });
    }

    #[test]
    fn too_many_operands() {
        let (mut env, _) = virtual_env();
        let result = main(&mut env, Field::dummies(["1", "2"]));
        assert_eq!(result, Result::new(ExitStatus::ERROR));
    }
}
