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

//! Type definitions for signals
//!
//! This module defines two abstractions for signals: [`Name`] and [`Number`].
//! The `Name` type identifies a signal by its name, while the `Number` type
//! represents a signal by the number the host system assigns to it.
//!
//! All proper signal names start with `"SIG"`. However, the names defined and
//! displayed in this module do not include the `"SIG"` prefix. Parsing accepts
//! names with or without the prefix, in any case.

use std::ffi::c_int;
use std::num::NonZeroI32;
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};
use thiserror::Error;

/// Raw signal number
pub type RawNumber = c_int;

/// Signal name
#[derive(Clone, Copy, Debug, EnumIter, Eq, Hash, IntoStaticStr, Ord, PartialEq, PartialOrd)]
#[strum(serialize_all = "UPPERCASE")]
#[non_exhaustive]
pub enum Name {
    Abrt,
    Alrm,
    Bus,
    Chld,
    Cont,
    Fpe,
    Hup,
    Ill,
    Int,
    Kill,
    Pipe,
    Prof,
    Quit,
    Segv,
    Stop,
    Sys,
    Term,
    Trap,
    Tstp,
    Ttin,
    Ttou,
    Urg,
    Usr1,
    Usr2,
    Vtalrm,
    Winch,
    Xcpu,
    Xfsz,
}

impl Name {
    /// Returns an iterator over all signal names in the alphabetical order.
    #[inline(always)]
    pub fn iter() -> NameIter {
        <Self as IntoEnumIterator>::iter()
    }

    /// Returns the name as an uppercase string without the `"SIG"` prefix.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns the signal number of this signal on the host system.
    #[must_use]
    pub const fn number(self) -> Number {
        use Name::*;
        match self {
            Abrt => Number::SIGABRT,
            Alrm => Number::SIGALRM,
            Bus => Number::SIGBUS,
            Chld => Number::SIGCHLD,
            Cont => Number::SIGCONT,
            Fpe => Number::SIGFPE,
            Hup => Number::SIGHUP,
            Ill => Number::SIGILL,
            Int => Number::SIGINT,
            Kill => Number::SIGKILL,
            Pipe => Number::SIGPIPE,
            Prof => Number::SIGPROF,
            Quit => Number::SIGQUIT,
            Segv => Number::SIGSEGV,
            Stop => Number::SIGSTOP,
            Sys => Number::SIGSYS,
            Term => Number::SIGTERM,
            Trap => Number::SIGTRAP,
            Tstp => Number::SIGTSTP,
            Ttin => Number::SIGTTIN,
            Ttou => Number::SIGTTOU,
            Urg => Number::SIGURG,
            Usr1 => Number::SIGUSR1,
            Usr2 => Number::SIGUSR2,
            Vtalrm => Number::SIGVTALRM,
            Winch => Number::SIGWINCH,
            Xcpu => Number::SIGXCPU,
            Xfsz => Number::SIGXFSZ,
        }
    }

    /// Returns the name of the signal having the given number.
    #[must_use]
    pub fn from_number(number: Number) -> Option<Name> {
        Name::iter().find(|name| name.number() == number)
    }

    /// Whether the default action for the signal terminates the process.
    ///
    /// Signals that are ignored or stop the process by default return false.
    #[must_use]
    pub const fn terminates_by_default(self) -> bool {
        use Name::*;
        !matches!(self, Chld | Cont | Urg | Winch | Stop | Tstp | Ttin | Ttou)
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_str().fmt(f)
    }
}

/// Error value for an unknown signal name
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
#[error("unknown signal name")]
pub struct UnknownNameError;

/// Parses a signal name.
///
/// The name may have the `"SIG"` prefix and is case-insensitive, so `"INT"`,
/// `"SIGINT"`, and `"sigint"` all parse to [`Name::Int`].
impl FromStr for Name {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, UnknownNameError> {
        let upper = s.to_ascii_uppercase();
        let name = upper.strip_prefix("SIG").unwrap_or(&upper);
        Name::iter()
            .find(|n| n.as_str() == name)
            .ok_or(UnknownNameError)
    }
}

/// Signal number
///
/// The number is guaranteed to be positive.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialOrd, PartialEq)]
#[repr(transparent)]
pub struct Number(NonZeroI32);

const fn number(raw: RawNumber) -> Number {
    match NonZeroI32::new(raw) {
        Some(raw) => Number(raw),
        None => panic!("signal number must be non-zero"),
    }
}

impl Number {
    pub const SIGABRT: Number = number(libc::SIGABRT);
    pub const SIGALRM: Number = number(libc::SIGALRM);
    pub const SIGBUS: Number = number(libc::SIGBUS);
    pub const SIGCHLD: Number = number(libc::SIGCHLD);
    pub const SIGCONT: Number = number(libc::SIGCONT);
    pub const SIGFPE: Number = number(libc::SIGFPE);
    pub const SIGHUP: Number = number(libc::SIGHUP);
    pub const SIGILL: Number = number(libc::SIGILL);
    pub const SIGINT: Number = number(libc::SIGINT);
    pub const SIGKILL: Number = number(libc::SIGKILL);
    pub const SIGPIPE: Number = number(libc::SIGPIPE);
    pub const SIGPROF: Number = number(libc::SIGPROF);
    pub const SIGQUIT: Number = number(libc::SIGQUIT);
    pub const SIGSEGV: Number = number(libc::SIGSEGV);
    pub const SIGSTOP: Number = number(libc::SIGSTOP);
    pub const SIGSYS: Number = number(libc::SIGSYS);
    pub const SIGTERM: Number = number(libc::SIGTERM);
    pub const SIGTRAP: Number = number(libc::SIGTRAP);
    pub const SIGTSTP: Number = number(libc::SIGTSTP);
    pub const SIGTTIN: Number = number(libc::SIGTTIN);
    pub const SIGTTOU: Number = number(libc::SIGTTOU);
    pub const SIGURG: Number = number(libc::SIGURG);
    pub const SIGUSR1: Number = number(libc::SIGUSR1);
    pub const SIGUSR2: Number = number(libc::SIGUSR2);
    pub const SIGVTALRM: Number = number(libc::SIGVTALRM);
    pub const SIGWINCH: Number = number(libc::SIGWINCH);
    pub const SIGXCPU: Number = number(libc::SIGXCPU);
    pub const SIGXFSZ: Number = number(libc::SIGXFSZ);

    /// Returns the raw signal number.
    #[inline(always)]
    #[must_use]
    pub const fn as_raw(self) -> RawNumber {
        self.0.get()
    }

    /// Converts a raw number to a `Number` if it names a supported signal.
    #[must_use]
    pub fn from_raw(raw: RawNumber) -> Option<Number> {
        Name::iter()
            .map(Name::number)
            .find(|number| number.as_raw() == raw)
    }

    /// Returns the name of the signal.
    #[must_use]
    pub fn name(self) -> Option<Name> {
        Name::from_number(self)
    }
}

impl std::fmt::Display for Number {
    #[inline(always)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Name> for Number {
    fn from(name: Name) -> Number {
        name.number()
    }
}
