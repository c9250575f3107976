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

//! Origin of source code passed to the parser

use std::fmt;
use std::rc::Rc;

/// Origin of source code
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source {
    /// Source of unknown origin
    ///
    /// Used mostly in tests.
    Unknown,

    /// Standard input
    Stdin,

    /// Command string specified with the `-c` option
    CommandString,

    /// Script file named on the command line
    Script { path: String },

    /// File executed by the `.` built-in
    DotScript {
        /// Pathname of the file
        name: String,
        /// Location of the simple command that invoked the `.` built-in
        origin: Location,
    },

    /// Command string executed by the `eval` built-in
    Eval {
        /// Location of the simple command that invoked the `eval` built-in
        original: Location,
    },

    /// Body of a function being called
    Function {
        /// Name of the function
        name: String,
        /// Location of the function definition
        origin: Location,
    },

    /// Action of a trap
    Trap {
        /// Condition that triggered the trap, e.g., `"INT"` or `"EXIT"`
        condition: String,
        /// Location of the simple command that set the trap, if known
        origin: Option<Location>,
    },
}

impl Source {
    /// Returns a short label describing the source.
    ///
    /// The label is used as a prefix of error messages.
    #[must_use]
    pub fn label(&self) -> &str {
        use Source::*;
        match self {
            Unknown => "<?>",
            Stdin => "<stdin>",
            CommandString => "<command_string>",
            Script { path } => path,
            DotScript { name, .. } => name,
            Eval { .. } => "<eval>",
            Function { name, .. } => name,
            Trap { condition, .. } => condition,
        }
    }
}

/// Position in source code
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Location {
    /// Origin of the code
    pub source: Rc<Source>,
    /// Line number, counted from 1
    pub line: u64,
}

impl Location {
    /// Creates a location of unknown origin at line 1.
    ///
    /// This function is mainly for use in tests.
    #[must_use]
    pub fn dummy() -> Self {
        Location {
            source: Rc::new(Source::Unknown),
            line: 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source.label(), self.line)
    }
}
