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

//! Items that define trap conditions

use crate::signal::{Name, Number, RawNumber};
use std::str::FromStr;
use thiserror::Error;

/// Condition under which an [`Action`](super::Action) is executed
///
/// Conditions are ordered so that `EXIT` comes first, signals follow in the
/// order of their numbers, and the other pseudo-signals come last. The trap
/// built-in lists traps in this order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Condition {
    /// When the shell exits
    Exit,
    /// When the specified signal is delivered to the shell process
    Signal(Number),
    /// Before each simple command is executed
    Debug,
    /// When a simple command returns a non-zero exit status
    Err,
    /// When a function or dot script returns
    Return,
}

impl Condition {
    /// Returns the signal number if this is a signal condition.
    #[must_use]
    pub fn signal(self) -> Option<Number> {
        match self {
            Condition::Signal(number) => Some(number),
            _ => None,
        }
    }
}

impl From<Number> for Condition {
    fn from(number: Number) -> Self {
        Condition::Signal(number)
    }
}

impl From<Name> for Condition {
    fn from(name: Name) -> Self {
        Condition::Signal(name.number())
    }
}

/// Conversion from `Condition` to `String`
///
/// The result is an uppercase string representing the condition such as
/// `"EXIT"` and `"TERM"`.
impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Exit => "EXIT".fmt(f),
            Condition::Signal(number) => match number.name() {
                Some(name) => name.fmt(f),
                None => number.fmt(f),
            },
            Condition::Debug => "DEBUG".fmt(f),
            Condition::Err => "ERR".fmt(f),
            Condition::Return => "RETURN".fmt(f),
        }
    }
}

/// Error in conversion from string to [`Condition`]
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
#[error("invalid signal specification")]
pub struct ParseConditionError;

/// Conversion from `String` to `Condition`
///
/// This implementation accepts case-insensitive names, with or without the
/// `SIG` prefix for signals, as well as signal numbers. The number `"0"`
/// denotes [`Condition::Exit`].
impl FromStr for Condition {
    type Err = ParseConditionError;

    fn from_str(s: &str) -> Result<Self, ParseConditionError> {
        if let Ok(number) = s.parse::<RawNumber>() {
            return if number == 0 {
                Ok(Condition::Exit)
            } else {
                Number::from_raw(number)
                    .map(Condition::Signal)
                    .ok_or(ParseConditionError)
            };
        }

        match s.to_ascii_uppercase().as_str() {
            "EXIT" => Ok(Condition::Exit),
            "DEBUG" => Ok(Condition::Debug),
            "ERR" => Ok(Condition::Err),
            "RETURN" => Ok(Condition::Return),
            _ => s
                .parse::<Name>()
                .map(Condition::from)
                .map_err(|_| ParseConditionError),
        }
    }
}
