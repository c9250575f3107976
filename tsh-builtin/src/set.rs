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

//! Set built-in
//!
//! The set built-in modifies [shell options](tsh_env::option) and positional
//! parameters. It also can print a list of current options or variables.
//!
//! # Syntax and semantics
//!
//! ## Printing variables
//!
//! ```sh
//! set
//! ```
//!
//! When executed without any arguments, the built-in prints the variables
//! visible in the current execution environment as assignments that would
//! restore them if executed. The list is ordered alphabetically.
//!
//! ## Printing options
//!
//! ```sh
//! set -o
//! ```
//!
//! If the `-o` option is the only argument, the built-in prints the current
//! option settings in a human-readable format.
//!
//! ```sh
//! set +o
//! ```
//!
//! With `+o` instead, the built-in prints commands that would restore the
//! current option settings if executed.
//!
//! ## Modifying shell options
//!
//! Other options modify [shell option](tsh_env::option::Option) settings.
//! They can be specified in the short form like `-e` or the long form like
//! `-o errexit` and `--errexit`. Options starting with `+` (as in `+e`,
//! `+o errexit` and `++errexit`) turn off the corresponding shell options.
//!
//! See [`parse_short`](tsh_env::option::parse_short) for the available short
//! options and [`parse_long`](tsh_env::option::parse_long) to learn how long
//! options are parsed. The `interactive` option cannot be modified by the
//! built-in.
//!
//! ## Modifying positional parameters
//!
//! If one or more operands are given, they become the new positional
//! parameters of the current context. A `--` or `-` separator without
//! operands clears the positional parameters.
//!
//! # Exit status
//!
//! - 0: successful
//! - 2: invalid options

use crate::common::report::report_error;
use tsh_env::Env;
use tsh_env::option::{self, State};
use tsh_env::semantics::Field;

pub mod syntax;

/// Interpretation of command-line arguments that determine the behavior of
/// the set built-in
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Print all variables
    PrintVariables,
    /// Print shell options in a human-readable format
    PrintOptionsHumanReadable,
    /// Print shell options in a machine-readable format
    PrintOptionsMachineReadable,
    /// Modify shell options and positional parameters
    Modify {
        /// Specifies shell options to be changed
        options: Vec<(option::Option, State)>,
        /// Specifies new positional parameters
        ///
        /// If `None`, the existing positional parameters are left intact.
        positional_params: Option<Vec<Field>>,
    },
}

impl Command {
    /// Executes the built-in.
    pub fn execute(self, env: &mut Env) -> crate::Result {
        match self {
            Command::PrintVariables => {
                let mut output = String::new();
                for (name, value) in env.variables.visible() {
                    output.push_str(&format!("{name}={}\n", yash_quote::quote(value)));
                }
                env.print(&output);
            }

            Command::PrintOptionsHumanReadable => {
                let output: String = option::Option::iter()
                    .map(|option| format!("{:16}{}\n", option, env.options.get(option)))
                    .collect();
                env.print(&output);
            }

            Command::PrintOptionsMachineReadable => {
                let output: String = option::Option::iter()
                    .map(|option| {
                        let flag = match env.options.get(option) {
                            State::On => '-',
                            State::Off => '+',
                        };
                        format!("set {flag}o {option}\n")
                    })
                    .collect();
                env.print(&output);
            }

            Command::Modify {
                options,
                positional_params,
            } => {
                for (option, state) in options {
                    log::debug!("set: {option} {state}");
                    env.options.set(option, state);
                }
                if let Some(params) = positional_params {
                    let params = params.into_iter().map(|field| field.value).collect();
                    env.variables.set_positional_params(params);
                }
            }
        }
        crate::Result::default()
    }
}

/// Entry point for executing the `set` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> crate::Result {
    match syntax::parse(args) {
        Ok(command) => command.execute(env),
        Err(error) => {
            let location = error.field().origin.clone();
            report_error(env, Some(&location), "set", &error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::env_with_builtins;
    use tsh_env::option::{ErrExit, FuncTrace, History, Interactive, Off, On};
    use tsh_env::semantics::ExitStatus;
    use tsh_env_test_helper::{assert_stderr, assert_stdout};

    #[test]
    fn setting_options_and_params() {
        let (mut env, _) = env_with_builtins();
        let result = main(&mut env, Field::dummies(["-eT", "+o", "history", "a", "b"]));
        assert_eq!(result, crate::Result::default());
        assert_eq!(env.options.get(ErrExit), On);
        assert_eq!(env.options.get(FuncTrace), On);
        assert_eq!(env.options.get(History), Off);
        assert_eq!(env.variables.positional_params(), ["a", "b"]);
    }

    #[test]
    fn clearing_params() {
        let (mut env, _) = env_with_builtins();
        env.variables.set_positional_params(vec!["x".to_string()]);
        _ = main(&mut env, Field::dummies(["-e"]));
        assert_eq!(env.variables.positional_params(), ["x"]);
        _ = main(&mut env, Field::dummies(["--"]));
        assert!(env.variables.positional_params().is_empty());
    }

    #[test]
    fn printing_options() {
        let (mut env, system) = env_with_builtins();
        env.options.set(ErrExit, On);
        _ = main(&mut env, Field::dummies(["+o"]));
        assert_stdout(&system.state, |stdout| {
            assert!(stdout.contains("set -o errexit\n"), "{stdout:?}");
            assert!(stdout.contains("set +o functrace\n"), "{stdout:?}");
            assert!(stdout.contains("set -o history\n"), "{stdout:?}");
        });
    }

    #[test]
    fn printing_variables() {
        let (mut env, system) = env_with_builtins();
        env.variables.assign("b".to_string(), "two words".to_string());
        env.variables.assign("a".to_string(), "1".to_string());
        _ = main(&mut env, vec![]);
        assert_stdout(&system.state, |stdout| {
            assert_eq!(stdout, "a=1\nb='two words'\n")
        });
    }

    #[test]
    fn unmodifiable_option() {
        let (mut env, system) = env_with_builtins();
        let result = main(&mut env, Field::dummies(["-i"]));
        assert_eq!(result, crate::Result::new(ExitStatus::ERROR));
        assert_eq!(env.options.get(Interactive), Off);
        assert_stderr(&system.state, |stderr| assert!(stderr.contains("set:"), "{stderr:?}"));
    }
}
