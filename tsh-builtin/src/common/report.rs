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

//! Error reporting utilities for built-ins
//!
//! This module provides utilities for printing error messages and computing
//! appropriate results for built-ins. A message is printed as
//!
//! ```text
//! tsh: <location>: <built-in name>: <message>
//! ```
//!
//! Errors in built-ins never divert the execution flow. The caller only sees
//! a non-zero exit status.

use std::fmt::Display;
use tsh_env::Env;
use tsh_env::builtin::Result;
use tsh_env::semantics::ExitStatus;
use tsh_syntax::source::Location;

/// Prints an error message and returns a result with the exit status.
///
/// If `location` is `None`, the message is printed without a location.
pub fn report<M: Display>(
    env: &mut Env,
    location: Option<&Location>,
    name: &str,
    message: M,
    exit_status: ExitStatus,
) -> Result {
    let message = format!("{name}: {message}");
    match location {
        Some(location) => env.print_error_at(location, &message),
        None => env.print_error(&message),
    }
    Result::new(exit_status)
}

/// Reports a failure with [`ExitStatus::FAILURE`].
///
/// Use this for errors that occur while the built-in performs its work, such
/// as a system call failure.
#[inline]
pub fn report_failure<M: Display>(
    env: &mut Env,
    location: Option<&Location>,
    name: &str,
    message: M,
) -> Result {
    report(env, location, name, message, ExitStatus::FAILURE)
}

/// Reports an error with [`ExitStatus::ERROR`].
///
/// Use this for errors in the command line arguments.
#[inline]
pub fn report_error<M: Display>(
    env: &mut Env,
    location: Option<&Location>,
    name: &str,
    message: M,
) -> Result {
    report(env, location, name, message, ExitStatus::ERROR)
}
