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

//! Type definitions for shell options
//!
//! This module defines the [`OptionSet`] struct, a map from [`Option`] to
//! [`State`]. The option set represents whether each option is on or off.
//!
//! Note that `OptionSet` merely manages the state of options. It is not the
//! responsibility of `OptionSet` to change the behavior of the shell according
//! to the options.

use enumset::EnumSet;
use enumset::EnumSetType;
use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::Not;
use std::str::FromStr;
use thiserror::Error;

/// State of an option: either enabled or disabled.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum State {
    /// Enabled.
    On,
    /// Disabled.
    Off,
}

pub use State::*;

/// Converts a state to a string (`on` or `off`).
impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            On => "on",
            Off => "off",
        };
        s.fmt(f)
    }
}

impl Not for State {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            On => Off,
            Off => On,
        }
    }
}

impl From<bool> for State {
    fn from(is_on: bool) -> Self {
        if is_on { On } else { Off }
    }
}

/// Shell option
///
/// Options are declared in alphabetical order of their long names.
#[derive(Clone, Copy, Debug, EnumSetType, Eq, Hash, PartialEq)]
#[enumset(no_super_impls)]
#[non_exhaustive]
pub enum Option {
    /// Lets the exit status of the DEBUG trap control command execution.
    Debugger,
    /// Makes the shell to exit when a command returns a non-zero exit status.
    ErrExit,
    /// Makes functions inherit the ERR trap.
    ErrTrace,
    /// Makes functions and subshells inherit the DEBUG and RETURN traps.
    FuncTrace,
    /// Records command lines in the in-memory history.
    History,
    /// Enables features for interactive use.
    Interactive,
    /// Enables job control.
    Monitor,
    /// Exits after executing one command.
    OneCommand,
}

pub use self::Option::*;

impl Option {
    /// Whether this option can be modified by the set built-in.
    ///
    /// Unmodifiable options can be set only on shell startup.
    #[must_use]
    pub fn is_modifiable(self) -> bool {
        !matches!(self, Interactive)
    }

    /// Returns the option name, all in lower case without punctuations.
    #[must_use]
    pub fn long_name(self) -> &'static str {
        match self {
            Debugger => "debugger",
            ErrExit => "errexit",
            ErrTrace => "errtrace",
            FuncTrace => "functrace",
            History => "history",
            Interactive => "interactive",
            Monitor => "monitor",
            OneCommand => "onecmd",
        }
    }

    /// Creates an iterator that yields all available options in alphabetical
    /// order.
    pub fn iter() -> impl Iterator<Item = Option> {
        EnumSet::<Option>::all().iter()
    }
}

/// Prints the option name, all in lower case without punctuations.
impl Display for Option {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.long_name().fmt(f)
    }
}

/// Error type indicating that the input string does not name a valid option.
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
pub enum FromStrError {
    /// The input string does not match any option name.
    #[error("no such option")]
    NoSuchOption,
    /// The input string is a prefix of more than one valid option name.
    #[error("ambiguous option name")]
    Ambiguous,
}

pub use FromStrError::*;

/// Parses an option name.
///
/// The option name may be abbreviated as long as it is an unambiguous prefix of
/// a valid option name. A full option name is never considered ambiguous.
impl FromStr for Option {
    type Err = FromStrError;
    fn from_str(name: &str) -> Result<Self, FromStrError> {
        let candidates = Option::iter()
            .filter(|option| option.long_name().starts_with(name))
            .collect::<Vec<_>>();
        if let Some(&exact) = candidates.iter().find(|option| option.long_name() == name) {
            return Ok(exact);
        }
        match candidates[..] {
            [] => Err(NoSuchOption),
            [only] => Ok(only),
            _ => Err(Ambiguous),
        }
    }
}

/// Parses a short option name.
///
/// ```
/// # use tsh_env::option::*;
/// assert_eq!(parse_short('e'), Some((ErrExit, On)));
/// assert_eq!(parse_short('E'), Some((ErrTrace, On)));
/// assert_eq!(parse_short('i'), Some((Interactive, On)));
/// assert_eq!(parse_short('m'), Some((Monitor, On)));
/// assert_eq!(parse_short('T'), Some((FuncTrace, On)));
/// assert_eq!(parse_short('t'), Some((OneCommand, On)));
/// assert_eq!(parse_short('x'), None);
/// ```
#[must_use]
pub fn parse_short(name: char) -> std::option::Option<(self::Option, State)> {
    match name {
        'E' => Some((ErrTrace, On)),
        'T' => Some((FuncTrace, On)),
        'e' => Some((ErrExit, On)),
        'i' => Some((Interactive, On)),
        'm' => Some((Monitor, On)),
        't' => Some((OneCommand, On)),
        _ => None,
    }
}

/// Parses a long option name.
///
/// This function is similar to `impl FromStr for Option`, but allows prefixing
/// the option name with `no` to negate the state.
pub fn parse_long(name: &str) -> Result<(Option, State), FromStrError> {
    if "no".starts_with(name) {
        return Err(Ambiguous);
    }

    let intact = Option::from_str(name);
    let without_no = name
        .strip_prefix("no")
        .ok_or(NoSuchOption)
        .and_then(Option::from_str);

    match (intact, without_no) {
        (Ok(option), Err(NoSuchOption)) => Ok((option, On)),
        (Err(NoSuchOption), Ok(option)) => Ok((option, Off)),
        (Err(Ambiguous), _) | (_, Err(Ambiguous)) => Err(Ambiguous),
        _ => Err(NoSuchOption),
    }
}

/// Set of the shell options and their states.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct OptionSet {
    enabled_options: EnumSet<Option>,
}

/// Defines the default option set.
///
/// The `History` option is enabled by default.
impl Default for OptionSet {
    fn default() -> Self {
        let enabled_options = EnumSet::only(History);
        OptionSet { enabled_options }
    }
}

impl OptionSet {
    /// Creates an option set with all options disabled.
    #[must_use]
    pub fn empty() -> Self {
        OptionSet {
            enabled_options: EnumSet::empty(),
        }
    }

    /// Returns the current state of the option.
    #[must_use]
    pub fn get(&self, option: Option) -> State {
        if self.enabled_options.contains(option) {
            On
        } else {
            Off
        }
    }

    /// Whether the option is on.
    #[must_use]
    pub fn is_on(&self, option: Option) -> bool {
        self.enabled_options.contains(option)
    }

    /// Changes an option's state.
    ///
    /// Some options should not be changed after the shell startup, but that
    /// does not affect the behavior of this function.
    pub fn set(&mut self, option: Option, state: State) {
        match state {
            On => self.enabled_options.insert(option),
            Off => self.enabled_options.remove(option),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_from_str_round_trip() {
        for option in Option::iter() {
            let name = option.to_string();
            assert_eq!(Option::from_str(&name), Ok(option));
        }
    }

    #[test]
    fn from_str_abbreviation() {
        assert_eq!(Option::from_str("deb"), Ok(Debugger));
        assert_eq!(Option::from_str("f"), Ok(FuncTrace));
        assert_eq!(Option::from_str("err"), Err(Ambiguous));
        assert_eq!(Option::from_str("errt"), Ok(ErrTrace));
        assert_eq!(Option::from_str(""), Err(Ambiguous));
        assert_eq!(Option::from_str("vi"), Err(NoSuchOption));
    }

    #[test]
    fn parse_long_negation() {
        assert_eq!(parse_long("errexit"), Ok((ErrExit, On)));
        assert_eq!(parse_long("noerrexit"), Ok((ErrExit, Off)));
        assert_eq!(parse_long("nohistory"), Ok((History, Off)));
        assert_eq!(parse_long("no"), Err(Ambiguous));
        assert_eq!(parse_long("novim"), Err(NoSuchOption));
    }

    #[test]
    fn option_set_get_and_set() {
        let mut options = OptionSet::default();
        assert_eq!(options.get(History), On);
        assert_eq!(options.get(ErrExit), Off);
        options.set(ErrExit, On);
        assert!(options.is_on(ErrExit));
        options.set(History, !options.get(History));
        assert!(!options.is_on(History));
    }
}
