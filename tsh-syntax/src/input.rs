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

//! Methods about passing [source](crate::source) code to the [parser](crate::parser).

use std::collections::VecDeque;

/// Error returned by the [Input] function.
pub type Error = std::io::Error;

/// Result of the [Input] function.
pub type Result = std::result::Result<String, Error>;

/// Line-oriented source code reader
pub trait Input {
    /// Reads a next line of the source code.
    ///
    /// The returned string is terminated by a newline unless the end of input
    /// is reached, in which case the remaining characters up to the end must
    /// be returned without a trailing newline. If there are no more characters
    /// at all, the returned line is empty.
    ///
    /// An error of kind [`Interrupted`](std::io::ErrorKind::Interrupted) means
    /// that reading was interrupted by a signal. The caller may retry after
    /// handling the signal. Other errors are not recoverable.
    fn next_line(&mut self) -> Result;
}

impl<T: Input + ?Sized> Input for Box<T> {
    fn next_line(&mut self) -> Result {
        (**self).next_line()
    }
}

/// Input function that reads from a string in memory
#[derive(Clone, Debug, Default)]
pub struct Memory {
    lines: VecDeque<String>,
}

impl Memory {
    /// Creates a new `Memory` that reads the given string.
    pub fn new(code: &str) -> Memory {
        let lines = code.split_inclusive('\n').map(str::to_owned).collect();
        Memory { lines }
    }
}

impl From<&str> for Memory {
    fn from(code: &str) -> Memory {
        Memory::new(code)
    }
}

impl Input for Memory {
    fn next_line(&mut self) -> Result {
        Ok(self.lines.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::{Input, Memory};

    #[test]
    fn memory_empty_source() {
        let mut input = Memory::new("");
        assert_eq!(input.next_line().unwrap(), "");
    }

    #[test]
    fn memory_three_lines() {
        let mut input = Memory::new("one\ntwo\nthree");
        assert_eq!(input.next_line().unwrap(), "one\n");
        assert_eq!(input.next_line().unwrap(), "two\n");
        assert_eq!(input.next_line().unwrap(), "three");
        assert_eq!(input.next_line().unwrap(), "");
        assert_eq!(input.next_line().unwrap(), "");
    }
}
