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

//! Definition of errors that happen in the parser.

use crate::source::Location;
use std::rc::Rc;
use thiserror::Error;

/// Types of syntax errors.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SyntaxError {
    /// A single quotation lacks a closing `'`.
    #[error("The single quote is not closed")]
    UnclosedSingleQuote { opening_location: Location },
    /// A double quotation lacks a closing `"`.
    #[error("The double quote is not closed")]
    UnclosedDoubleQuote { opening_location: Location },
    /// A braced parameter expansion lacks a closing `}`.
    #[error("The parameter expansion is not closed")]
    UnclosedParam { opening_location: Location },
    /// A braced parameter expansion lacks a name.
    #[error("The parameter name is missing")]
    EmptyParam,
    /// A braced parameter expansion contains a character not allowed in a name.
    #[error("The parameter name is invalid")]
    InvalidParam,
    /// A function body is not closed by a `}`.
    #[error("The function body is not closed")]
    UnclosedFunctionBody { opening_location: Location },
    /// The `{` is missing after `NAME()`.
    #[error("The function body is missing")]
    MissingFunctionBody,
    /// A command starts with a `;`.
    #[error("`;` is not preceded by a command")]
    UnexpectedSemicolon,
}

/// Types of errors that may happen in parsing.
#[derive(Clone, Debug, Error)]
pub enum ErrorCause {
    /// Error in an underlying input function.
    #[error("Error while reading commands: {0}")]
    Io(Rc<std::io::Error>),
    /// Syntax error.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl ErrorCause {
    /// Whether this error was caused by a signal interrupting the input.
    ///
    /// Parsing may be retried after the signal is handled.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, ErrorCause::Io(e) if e.kind() == std::io::ErrorKind::Interrupted)
    }
}

impl PartialEq for ErrorCause {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ErrorCause::Syntax(e1), ErrorCause::Syntax(e2)) => e1 == e2,
            _ => false,
        }
    }
}

impl From<std::io::Error> for ErrorCause {
    fn from(e: std::io::Error) -> ErrorCause {
        ErrorCause::Io(Rc::new(e))
    }
}

/// Explanation of a failure in parsing.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    pub cause: ErrorCause,
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_for_error() {
        let error = Error {
            cause: SyntaxError::MissingFunctionBody.into(),
            location: Location::dummy(),
        };
        assert_eq!(error.to_string(), "The function body is missing");
    }

    #[test]
    fn interrupted_input() {
        let cause = ErrorCause::from(std::io::Error::from(std::io::ErrorKind::Interrupted));
        assert!(cause.is_interrupted());

        let cause = ErrorCause::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(!cause.is_interrupted());

        let cause = ErrorCause::from(SyntaxError::EmptyParam);
        assert!(!cause.is_interrupted());
    }
}
