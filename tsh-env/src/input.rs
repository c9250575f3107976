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

//! Input functions that read from the system

use crate::system::{Errno, Fd, SharedSystem};
use std::io;
use tsh_syntax::input::{Input, Result};

/// Input function that reads lines from a file descriptor
///
/// A signal interrupting the read is reported as an error of kind
/// [`Interrupted`](io::ErrorKind::Interrupted) so that the caller can run
/// pending traps before retrying.
#[derive(Clone, Debug)]
pub struct FdReader {
    system: SharedSystem,
    fd: Fd,
}

impl FdReader {
    /// Creates a new reader.
    pub fn new(system: SharedSystem, fd: Fd) -> Self {
        FdReader { system, fd }
    }
}

impl Input for FdReader {
    fn next_line(&mut self) -> Result {
        match self.system.read_line(self.fd) {
            Ok(Some(mut line)) => {
                line.push('\n');
                Ok(line)
            }
            Ok(None) => Ok(String::new()),
            Err(Errno::EINTR) => Err(io::ErrorKind::Interrupted.into()),
            Err(errno) => Err(io::Error::from_raw_os_error(errno as i32)),
        }
    }
}
