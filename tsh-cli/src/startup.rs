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

//! Shell startup

use self::args::{Run, Source};
use std::rc::Rc;
use thiserror::Error;
use tsh_env::Env;
use tsh_env::input::FdReader;
use tsh_env::system::{Errno, Fd};
use tsh_syntax::input::{Input, Memory};
use tsh_syntax::source::Source as SyntaxSource;

pub mod args;

/// Applies the command line configuration to the environment.
///
/// This function sets the shell options, `$0` and the positional
/// parameters, installs the built-ins and then the shell's internal signal
/// handlers, which depend on the options.
pub fn configure_environment(env: &mut Env, run: Run) {
    for (option, state) in run.options {
        env.options.set(option, state);
    }
    env.arg0 = run.arg0;
    env.variables.set_positional_params(run.positional_params);
    env.builtins.extend(tsh_builtin::BUILTINS.iter().copied());

    if let Err(errno) = env.install_internal_handlers() {
        log::warn!("cannot install internal signal handlers: {errno}");
    }
}

/// Error returned by [`prepare_input`]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("cannot open script file `{path}`: {errno}")]
pub struct PrepareInputError {
    /// Raw error value returned by the underlying system call
    pub errno: Errno,
    /// Path of the script file that could not be opened
    pub path: String,
}

/// Prepares the input for the read-eval loop.
///
/// The standard input is read line by line so that the shell can respond to
/// signals while waiting. A script file is read at once.
pub fn prepare_input(
    env: &Env,
    source: &Source,
) -> Result<(Box<dyn Input>, SyntaxSource), PrepareInputError> {
    match source {
        Source::Stdin => {
            let reader = FdReader::new(Rc::clone(&env.system), Fd::STDIN);
            Ok((Box::new(reader), SyntaxSource::Stdin))
        }

        Source::File { path } => {
            let content = env.system.read_file(path).map_err(|errno| PrepareInputError {
                errno,
                path: path.clone(),
            })?;
            let source = SyntaxSource::Script { path: path.clone() };
            Ok((Box::new(Memory::new(&content)), source))
        }

        Source::String(command) => {
            let input = Memory::new(command);
            Ok((Box::new(input), SyntaxSource::CommandString))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tsh_env::option::{Interactive, Monitor, On};
    use tsh_env::signal::Number;
    use tsh_env::system::Disposition;
    use tsh_env_test_helper::virtual_env;

    fn run(source: Source) -> Run {
        Run {
            options: vec![],
            source,
            arg0: "tsh".to_string(),
            positional_params: vec![],
        }
    }

    #[test]
    fn interactive_shell_catches_interrupt() {
        let (mut env, system) = virtual_env();
        let mut run = run(Source::Stdin);
        run.options = vec![(Interactive, On)];
        run.positional_params = vec!["a".to_string()];
        configure_environment(&mut env, run);

        assert!(env.is_interactive());
        assert!(env.builtins.contains_key("trap"));
        assert_eq!(env.variables.positional_params(), ["a"]);
        assert_eq!(system.disposition(Number::SIGINT), Disposition::Catch);
        assert_eq!(system.disposition(Number::SIGCHLD), Disposition::Default);
    }

    #[test]
    fn monitor_option_catches_sigchld() {
        let (mut env, system) = virtual_env();
        let mut run = run(Source::Stdin);
        run.options = vec![(Monitor, On)];
        configure_environment(&mut env, run);
        assert_eq!(system.disposition(Number::SIGCHLD), Disposition::Catch);
        assert_eq!(system.disposition(Number::SIGINT), Disposition::Default);
    }

    #[test]
    fn missing_script_file() {
        let (env, _) = virtual_env();
        let source = Source::File {
            path: "nonexistent".to_string(),
        };
        assert_matches!(
            prepare_input(&env, &source).map(|_| ()),
            Err(PrepareInputError { errno: Errno::ENOENT, path }) if path == "nonexistent"
        );
    }

    #[test]
    fn script_file_source() {
        let (env, system) = virtual_env();
        system
            .state
            .borrow_mut()
            .files
            .insert("script".to_string(), "echo\n".to_string());
        let source = Source::File {
            path: "script".to_string(),
        };
        let (_, source) = prepare_input(&env, &source).unwrap();
        assert_eq!(
            source,
            SyntaxSource::Script {
                path: "script".to_string()
            }
        );
    }
}
