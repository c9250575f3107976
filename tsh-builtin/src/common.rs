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

//! Common items for implementing built-ins.

use std::ops::ControlFlow::{Break, Continue};
use tsh_env::Env;
use tsh_env::builtin::Result;
use tsh_env::semantics::ExitStatus;
use tsh_env::signal::Name;

pub mod report;
pub mod syntax;

/// Converts the outcome of an evaluation into the result of a built-in.
///
/// The exit status of the built-in is the current `$?`. A `Break` becomes the
/// divert of the built-in.
pub fn to_result(env: &Env, flow: tsh_env::semantics::Result) -> Result {
    match flow {
        Continue(()) => Result::new(env.exit_status),
        Break(divert) => Result::with_exit_status_and_divert(env.exit_status, Some(divert)),
    }
}

/// Parses an exit status operand.
///
/// The operand must be a non-negative decimal integer.
#[must_use]
pub fn parse_exit_status(value: &str) -> Option<ExitStatus> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok().map(ExitStatus)
}

/// Returns the list of supported signal names, one per line.
#[must_use]
pub fn signal_list() -> String {
    Name::iter().map(|name| format!("{name}\n")).collect()
}
