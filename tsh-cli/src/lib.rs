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

//! This is an internal library crate for the tsh shell. **This crate is not
//! intended to be used as a library by other crates.**
//!
//! The entry point for the shell is the [`main`] function, which is to be used
//! as the `main` function in the binary crate. The function sets up the shell
//! environment and runs the main read-eval loop.
//!
//! Log records are printed to the standard error according to the
//! `TSH_LOG` environment variable, which takes the same syntax as
//! `RUST_LOG` in [`env_logger`].

pub mod startup;

use self::startup::args::{self, Parse};
use self::startup::{configure_environment, prepare_input};
use std::rc::Rc;
use tsh_env::Env;
use tsh_env::semantics::ExitStatus;
use tsh_env::signal::Number;
use tsh_env::system::Disposition;
use tsh_env::system::real::RealSystem;
use tsh_semantics::read_eval_loop;

/// Name of the environment variable that configures logging
pub const LOG_ENV: &str = "TSH_LOG";

fn init_logger() {
    let env = env_logger::Env::new().filter(LOG_ENV);
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();
}

/// Runs the shell with the arguments and returns the final exit status.
///
/// The first argument is the name of the shell.
pub fn run_shell<I>(env: &mut Env, arguments: I) -> ExitStatus
where
    I: IntoIterator<Item = String>,
{
    let run = match args::parse(arguments) {
        Ok(Parse::Version) => {
            env.print(&format!("tsh {}\n", env!("CARGO_PKG_VERSION")));
            return ExitStatus::SUCCESS;
        }
        Ok(Parse::Run(run)) => run,
        Err(error) => {
            env.print_error(&error.to_string());
            return ExitStatus::ERROR;
        }
    };

    let source = run.source.clone();
    configure_environment(env, run);

    let (input, source) = match prepare_input(env, &source) {
        Ok(input) => input,
        Err(error) => {
            env.print_error(&error.to_string());
            return ExitStatus::NOT_FOUND;
        }
    };
    read_eval_loop(env, input, Rc::new(source))
}

/// Entry point of the shell process
pub fn main() -> ! {
    init_logger();

    // SAFETY: This is the only instance of RealSystem we create in the whole
    // process.
    let system = unsafe { RealSystem::new() };
    let mut env = Env::with_system(Rc::new(system));

    // Rust by default sets SIGPIPE to SIG_IGN, which is not desired.
    if let Err(errno) = env.system.sigaction(Number::SIGPIPE, Disposition::Default) {
        log::warn!("cannot reset SIGPIPE: {errno}");
    }

    let exit_status = run_shell(&mut env, std::env::args());
    log::debug!("exiting with {exit_status}");
    std::process::exit(exit_status.0 & 0xFF)
}
