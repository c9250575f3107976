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

//! Shell command language syntax
//!
//! The grammar is intentionally small. A [`Command`] is either a simple
//! command, which is a sequence of [`Word`]s, or a function definition whose
//! body is stored as unparsed text and parsed again on each call.

use crate::source::Location;
use std::fmt;
use std::rc::Rc;

/// Special or positional parameter, or variable
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Param {
    /// `$?`
    ExitStatus,
    /// `$#`
    Count,
    /// `$$`
    ProcessId,
    /// `$0` through `$9`
    Positional(usize),
    /// `$NAME` or `${NAME}`
    Variable(String),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::ExitStatus => f.write_str("$?"),
            Param::Count => f.write_str("$#"),
            Param::ProcessId => f.write_str("$$"),
            Param::Positional(index) => write!(f, "${index}"),
            Param::Variable(name) => write!(f, "${{{name}}}"),
        }
    }
}

/// Element of a [`Word`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WordUnit {
    /// Literal string, with quotes already removed
    Literal(String),
    /// Parameter expansion
    Param(Param),
}

/// Token that is expanded to a field
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Word {
    pub units: Vec<WordUnit>,
    pub location: Location,
}

impl Word {
    /// Returns the literal value of the word if it contains no expansion.
    #[must_use]
    pub fn to_literal(&self) -> Option<String> {
        self.units.iter().try_fold(String::new(), |mut s, unit| {
            let WordUnit::Literal(literal) = unit else {
                return None;
            };
            s.push_str(literal);
            Some(s)
        })
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.units.iter().try_for_each(|unit| match unit {
            WordUnit::Literal(literal) => f.write_str(literal),
            WordUnit::Param(param) => param.fmt(f),
        })
    }
}

/// Command that can be executed
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Sequence of words, possibly preceded by assignments
    Simple {
        words: Vec<Word>,
        location: Location,
    },
    /// `NAME() { body }`
    FunctionDefinition {
        name: String,
        /// Unparsed text between the braces
        body: Rc<str>,
        location: Location,
    },
}

impl Command {
    /// Returns the location of the first token of the command.
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            Command::Simple { location, .. } => location,
            Command::FunctionDefinition { location, .. } => location,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Simple { words, .. } => {
                let mut words = words.iter();
                if let Some(first) = words.next() {
                    first.fmt(f)?;
                }
                words.try_for_each(|word| write!(f, " {word}"))
            }
            Command::FunctionDefinition { name, body, .. } => {
                write!(f, "{name}() {{ {body} }}")
            }
        }
    }
}
