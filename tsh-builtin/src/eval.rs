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

//! Eval built-in
//!
//! The **`eval`** built-in evaluates its arguments as shell commands.
//!
//! # Synopsis
//!
//! ```sh
//! eval [command…]
//! ```
//!
//! # Description
//!
//! The operands are joined with spaces into a single command string, which
//! is parsed and executed in the current shell environment.
//!
//! Inside a function or dot script, a `return` in the command string returns
//! from the function or dot script.
//!
//! # Exit status
//!
//! The exit status of the last command executed, or zero if the command
//! string contains no command.

use crate::Result;
use crate::common::to_result;
use tsh_env::Env;
use tsh_env::semantics::Field;
use tsh_semantics::eval_string;

/// Entry point of the `eval` built-in execution
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let Some(command) = join(args) else {
        return Result::default();
    };
    let flow = eval_string(env, &command.value, command.origin);
    to_result(env, flow)
}

/// Joins the arguments to make a single command string.
///
/// The result has the location of the first argument.
fn join(args: Vec<Field>) -> Option<Field> {
    let mut args = args.into_iter();
    let mut command = args.next()?;
    for arg in args {
        command.value.push(' ');
        command.value.push_str(&arg.value);
    }
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{env_with_builtins, run};
    use std::ops::ControlFlow::Continue;
    use tsh_env::semantics::{Divert, ExitStatus};
    use tsh_env_test_helper::assert_stdout;

    #[test]
    fn no_operands() {
        let (mut env, _) = env_with_builtins();
        env.exit_status = ExitStatus(5);
        let result = main(&mut env, vec![]);
        assert_eq!(result, Result::default());
    }

    #[test]
    fn operands_are_joined_and_evaluated() {
        let (mut env, system) = env_with_builtins();
        let result = main(&mut env, Field::dummies(["echo", "a;", "echo", "b;", "false"]));
        assert_eq!(result, Result::new(ExitStatus::FAILURE));
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, "a\nb\n"));
    }

    #[test]
    fn exit_in_eval_is_passed_through() {
        let (mut env, _) = env_with_builtins();
        let result = main(&mut env, Field::dummies(["exit 4"]));
        assert_eq!(
            result.divert(),
            Some(Divert::ExitFromBuiltin(Some(ExitStatus(4))))
        );
    }

    #[test]
    fn return_in_eval_returns_from_function() {
        let (mut env, system) = env_with_builtins();
        let result = run(
            &mut env,
            "f() { eval 'echo in; return 6; echo not reached'; echo not reached; }\n\
             f; echo $?",
        );
        assert_eq!(result, Continue(()));
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, "in\n6\n"));
        assert_eq!(env.return_catch_depth, 0);
    }

    #[test]
    fn return_in_eval_at_top_level_is_an_error() {
        let (mut env, _) = env_with_builtins();
        let result = run(&mut env, "eval return 3");
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
    }
}
