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

//! Type definitions for command execution.

use crate::signal;
use std::ffi::c_int;
use std::ops::ControlFlow;
use tsh_syntax::source::Location;

/// Resultant string of word expansion.
///
/// A field is a string accompanied with the original word location.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    /// String value of the field.
    pub value: String,
    /// Location of the word this field resulted from.
    pub origin: Location,
}

impl Field {
    /// Creates a new field with a dummy origin location.
    #[inline]
    pub fn dummy<S: Into<String>>(value: S) -> Field {
        Field {
            value: value.into(),
            origin: Location::dummy(),
        }
    }

    /// Creates an array of fields with dummy origin locations.
    pub fn dummies<I, S>(values: I) -> Vec<Field>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values.into_iter().map(Self::dummy).collect()
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}

/// Number that summarizes the result of command execution.
///
/// In the shell language, the special parameter `$?` expands to the exit status
/// of the last executed command.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExitStatus(pub c_int);

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<c_int> for ExitStatus {
    fn from(value: c_int) -> ExitStatus {
        ExitStatus(value)
    }
}

impl From<ExitStatus> for c_int {
    fn from(exit_status: ExitStatus) -> c_int {
        exit_status.0
    }
}

/// Converts a signal to the corresponding exit status.
///
/// The result is `128 + signal_number`, which is what commands killed or
/// interrupted by the signal report.
impl From<signal::Number> for ExitStatus {
    fn from(signal: signal::Number) -> Self {
        Self(signal.as_raw() + 0x80)
    }
}

impl ExitStatus {
    /// Exit status of 0: success.
    pub const SUCCESS: ExitStatus = ExitStatus(0);

    /// Exit status of 1: failure.
    pub const FAILURE: ExitStatus = ExitStatus(1);

    /// Exit status of 2: error severer than failure.
    pub const ERROR: ExitStatus = ExitStatus(2);

    /// Exit Status of 126: command not executable.
    pub const NOEXEC: ExitStatus = ExitStatus(126);

    /// Exit status of 127: command not found.
    pub const NOT_FOUND: ExitStatus = ExitStatus(127);

    /// Returns true if and only if `self` is zero.
    pub const fn is_successful(&self) -> bool {
        self.0 == 0
    }

    /// Returns the signal this exit status was derived from, if any.
    #[must_use]
    pub fn to_signal(self) -> Option<signal::Number> {
        self.0
            .checked_sub(0x80)
            .and_then(signal::Number::from_raw)
    }
}

/// Non-local transfer of control.
///
/// A `Divert` travels up the call chain as the `Break` value of a
/// [`Result`] until an evaluator catches it. Each variant carries an optional
/// exit status that replaces `$?` when the transfer is caught.
///
/// `Divert` implements `Ord`. Values are ordered by severity.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Divert {
    /// Return from the current function or dot script.
    Return(Option<ExitStatus>),
    /// Abandon the current command and resume at the innermost evaluation
    /// loop.
    Discard(Option<ExitStatus>),
    /// End reading input as if the end of input had been reached.
    ForceEndOfInput(Option<ExitStatus>),
    /// Exit because a command failed while the `errexit` option is on.
    ErrExit(Option<ExitStatus>),
    /// Exit requested by the `exit` built-in, before the EXIT trap has been
    /// considered.
    ExitFromBuiltin(Option<ExitStatus>),
    /// Exit from the current shell execution environment.
    Exit(Option<ExitStatus>),
    /// Transfer that no handler recognizes.
    Unhandled,
}

impl Divert {
    /// Returns the exit status associated with the `Divert`.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        use Divert::*;
        match self {
            Return(exit_status)
            | Discard(exit_status)
            | ForceEndOfInput(exit_status)
            | ErrExit(exit_status)
            | ExitFromBuiltin(exit_status)
            | Exit(exit_status) => *exit_status,
            Unhandled => None,
        }
    }

    /// Whether this transfer terminates the read-eval loop.
    ///
    /// Evaluators never swallow these; they are re-raised until the
    /// outermost loop exits.
    pub fn is_exit(&self) -> bool {
        use Divert::*;
        matches!(
            self,
            ForceEndOfInput(_) | ErrExit(_) | ExitFromBuiltin(_) | Exit(_)
        )
    }
}

/// Result of command execution.
///
/// If the command was interrupted in the middle of execution, the result value
/// will be a `Break` having a [`Divert`] value which specifies what to execute
/// next.
pub type Result<T = ()> = ControlFlow<Divert, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_status_from_signal() {
        let status = ExitStatus::from(signal::Number::SIGINT);
        assert_eq!(status, ExitStatus(128 + libc::SIGINT));
        assert_eq!(status.to_signal(), Some(signal::Number::SIGINT));
        assert_eq!(ExitStatus(3).to_signal(), None);
    }

    #[test]
    fn divert_ordering_and_status() {
        assert!(Divert::Return(None) < Divert::Discard(None));
        assert!(Divert::Exit(None) < Divert::Unhandled);
        assert_eq!(
            Divert::ErrExit(Some(ExitStatus(4))).exit_status(),
            Some(ExitStatus(4))
        );
        assert_eq!(Divert::Unhandled.exit_status(), None);
        assert!(Divert::ForceEndOfInput(None).is_exit());
        assert!(!Divert::Discard(None).is_exit());
        assert!(!Divert::Return(None).is_exit());
    }
}
