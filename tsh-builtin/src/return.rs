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

//! Return built-in
//!
//! The **`return`** built-in quits the currently executing innermost function
//! or dot script.
//!
//! # Synopsis
//!
//! ```sh
//! return [exit_status]
//! ```
//!
//! # Operands
//!
//! The optional ***exit_status*** operand, if given, should be a non-negative
//! decimal integer and will be the exit status of the function or script.
//!
//! # Exit status
//!
//! If the operand is not given, the exit status is the current value of
//! `$?`, or the value of `$?` before entering the trap if the built-in is
//! invoked in a trap.
//!
//! # Errors
//!
//! It is an error to use the built-in outside a function or dot script. An
//! invalid operand is also an error. In either case the built-in does not
//! return from anything.
//!
//! # Implementation notes
//!
//! The built-in returns a [`Divert::Return`], which is caught by the function
//! call or dot script. An `eval` inside a function passes the divert through
//! to the function.

use crate::Result;
use crate::common::parse_exit_status;
use crate::common::report::{report_error, report_failure};
use crate::common::syntax::parse_arguments;
use tsh_env::Env;
use tsh_env::semantics::{Divert, Field};

/// Entry point for executing the `return` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operands = match parse_arguments(&[], args) {
        Ok((_, operands)) => operands,
        Err(error) => return report_error(env, Some(&error.field().origin), "return", &error),
    };

    if let Some(extra) = operands.get(1) {
        return report_error(env, Some(&extra.origin), "return", "too many operands");
    }

    let exit_status = match operands.first() {
        None => None,
        Some(operand) => match parse_exit_status(&operand.value) {
            Some(exit_status) => Some(exit_status),
            None => {
                let message = format!("`{}` is not a valid exit status", operand.value);
                return report_error(env, Some(&operand.origin), "return", message);
            }
        },
    };

    if !env.stack.can_return() {
        let location = operands.first().map(|operand| &operand.origin);
        return report_failure(env, location, "return", "not in a function or dot script");
    }

    let status = exit_status.unwrap_or_else(|| match env.stack.current_trap() {
        Some((_, previous_exit_status)) => previous_exit_status,
        None => env.exit_status,
    });
    Result::with_exit_status_and_divert(status, Some(Divert::Return(exit_status)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsh_env::semantics::ExitStatus;
    use tsh_env::stack::Frame;
    use tsh_env_test_helper::{assert_stderr, virtual_env};

    fn in_function(env: &mut Env) -> tsh_env::stack::EnvFrameGuard<'_> {
        env.push_frame(Frame::Function {
            name: "f".to_string(),
        })
    }

    #[test]
    fn return_with_operand() {
        let (mut env, _) = virtual_env();
        let mut env = in_function(&mut env);
        let result = main(&mut env, Field::dummies(["7"]));
        assert_eq!(
            result,
            Result::with_exit_status_and_divert(
                ExitStatus(7),
                Some(Divert::Return(Some(ExitStatus(7))))
            )
        );
    }

    #[test]
    fn return_without_operand() {
        let (mut env, _) = virtual_env();
        env.exit_status = ExitStatus(3);
        let mut env = env.push_frame(Frame::DotScript);
        let result = main(&mut env, vec![]);
        assert_eq!(
            result,
            Result::with_exit_status_and_divert(ExitStatus(3), Some(Divert::Return(None)))
        );
    }

    #[test]
    fn return_outside_function() {
        let (mut env, system) = virtual_env();
        let result = main(&mut env, vec![]);
        assert_eq!(result, Result::new(ExitStatus::FAILURE));
        assert_stderr(&system.state, |stderr| {
            assert_eq!(stderr, "tsh: return: not in a function or dot script\n")
        });
    }

    #[test]
    fn invalid_operand() {
        let (mut env, _) = virtual_env();
        let mut env = in_function(&mut env);
        let result = main(&mut env, Field::dummies(["-1"]));
        assert_eq!(result, Result::new(ExitStatus::ERROR));
    }
}
