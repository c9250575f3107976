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

//! Convenience functions for printing

use crate::Env;
use crate::system::Fd;
use tsh_syntax::source::Location;

/// Name printed at the head of diagnostics
pub const SHELL_NAME: &str = "tsh";

impl Env {
    /// Prints the text to the standard output.
    ///
    /// Errors are logged and otherwise ignored.
    pub fn print(&self, text: &str) {
        if let Err(errno) = self.system.write_all(Fd::STDOUT, text.as_bytes()) {
            log::warn!("cannot write to the standard output: {errno}");
        }
    }

    /// Prints an error message to the standard error.
    ///
    /// The message is prefixed with the shell name and terminated by a
    /// newline.
    pub fn print_error(&self, message: &str) {
        let text = format!("{SHELL_NAME}: {message}\n");
        if let Err(errno) = self.system.write_all(Fd::STDERR, text.as_bytes()) {
            log::warn!("cannot write to the standard error: {errno}");
        }
    }

    /// Prints an error message with the location it relates to.
    pub fn print_error_at(&self, location: &Location, message: &str) {
        self.print_error(&format!("{location}: {message}"))
    }
}
