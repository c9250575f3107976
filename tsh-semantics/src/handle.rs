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

//! Error handlers.

use crate::{Divert, ExitStatus, Result};
use std::ops::ControlFlow::Break;
use tsh_env::Env;
use tsh_syntax::parser::ErrorCause;

/// Error handler.
///
/// Most errors in the shell are handled by printing an error message to the
/// standard error and returning a non-zero exit status. This trait provides a
/// standard interface for implementing that behavior.
pub trait Handle {
    /// Handles the argument error.
    fn handle(&self, env: &mut Env) -> Result;
}

/// Prints an error message.
///
/// A syntax error is handled by returning
/// `Divert::Discard(Some(ExitStatus::ERROR))` so that the innermost
/// evaluator skips to the next command. An I/O error ends the input with
/// `Divert::ForceEndOfInput(Some(ExitStatus::ERROR))` since the input cannot
/// be read any further.
impl Handle for tsh_syntax::parser::Error {
    fn handle(&self, env: &mut Env) -> Result {
        env.print_error_at(&self.location, &self.to_string());
        env.exit_status = ExitStatus::ERROR;
        match self.cause {
            ErrorCause::Io(_) => Break(Divert::ForceEndOfInput(Some(ExitStatus::ERROR))),
            ErrorCause::Syntax(_) => Break(Divert::Discard(Some(ExitStatus::ERROR))),
        }
    }
}
