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

//! Command line parsing for the kill built-in
//!
//! The parser does not use [`crate::common::syntax`] because a signal can be
//! given as an option like `-INT`.

use super::{Command, parse_signal};
use thiserror::Error;
use tsh_env::semantics::Field;
use tsh_env::signal::Number;

/// Error that may occur during parsing
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// An argument starts with a hyphen but is not a valid option.
    #[error("`{}` is not a valid option", .0.value)]
    UnknownOption(Field),

    /// The `-s` option is not followed by a signal.
    #[error("missing signal name")]
    MissingSignal(Field),

    /// The signal is not a valid signal name or number.
    #[error("`{}` is not a valid signal", .0.value)]
    InvalidSignal(Field),

    /// Both a signal and the `-l` option are given.
    #[error("a signal cannot be specified with -l")]
    ConflictingOptions(Field),

    /// No target is specified.
    #[error("no target process specified")]
    MissingTarget,
}

impl Error {
    /// Returns the argument the error is about, if any.
    #[must_use]
    pub fn field(&self) -> Option<&Field> {
        match self {
            Error::UnknownOption(field)
            | Error::MissingSignal(field)
            | Error::InvalidSignal(field)
            | Error::ConflictingOptions(field) => Some(field),
            Error::MissingTarget => None,
        }
    }
}

/// Parses command line arguments.
pub fn parse(args: Vec<Field>) -> Result<Command, Error> {
    let mut args = args.into_iter().peekable();
    let mut signal = None;
    let mut list = None;

    while let Some(arg) = args.next_if(|arg| arg.value.starts_with('-') && arg.value != "-") {
        match arg.value.as_str() {
            "--" => break,
            "-l" => list = Some(arg),
            "-s" => {
                let name = args.next().ok_or_else(|| Error::MissingSignal(arg.clone()))?;
                let number = parse_signal(&name.value)
                    .ok_or_else(|| Error::InvalidSignal(name.clone()))?;
                signal = Some((number, name));
            }
            value => {
                let number =
                    parse_signal(&value[1..]).ok_or_else(|| Error::UnknownOption(arg.clone()))?;
                signal = Some((number, arg));
            }
        }
    }

    parse_targets(signal, list, args)
}

fn parse_targets<I>(
    signal: Option<(Number, Field)>,
    list: Option<Field>,
    operands: I,
) -> Result<Command, Error>
where
    I: Iterator<Item = Field>,
{
    let operands = operands.collect::<Vec<_>>();
    if list.is_some() {
        if let Some((_, field)) = signal {
            return Err(Error::ConflictingOptions(field));
        }
        return Ok(Command::Print { operands });
    }
    if operands.is_empty() {
        return Err(Error::MissingTarget);
    }
    let signal = signal.map_or(Number::SIGTERM, |(number, _)| number);
    Ok(Command::Send {
        signal,
        targets: operands,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn signal_forms() {
        for args in [["-s", "INT", "1"], ["-s", "sigint", "1"], ["-INT", "1", "--"]] {
            let command = parse(Field::dummies(args)).unwrap();
            assert_matches!(command, Command::Send { signal, .. } if signal == Number::SIGINT);
        }
        let command = parse(Field::dummies(["-9", "5"])).unwrap();
        assert_matches!(command, Command::Send { signal, .. } if signal == Number::SIGKILL);
    }

    #[test]
    fn targets_after_separator() {
        let command = parse(Field::dummies(["--", "-5", "6"])).unwrap();
        assert_eq!(
            command,
            Command::Send {
                signal: Number::SIGTERM,
                targets: Field::dummies(["-5", "6"]),
            }
        );
    }

    #[test]
    fn list_option() {
        let command = parse(Field::dummies(["-l", "130"])).unwrap();
        assert_eq!(
            command,
            Command::Print {
                operands: Field::dummies(["130"])
            }
        );
        assert_matches!(
            parse(Field::dummies(["-l", "-s", "INT"])),
            Err(Error::ConflictingOptions(_))
        );
    }

    #[test]
    fn errors() {
        assert_eq!(parse(vec![]), Err(Error::MissingTarget));
        assert_eq!(parse(Field::dummies(["-HUP"])), Err(Error::MissingTarget));
        assert_matches!(parse(Field::dummies(["-s"])), Err(Error::MissingSignal(_)));
        assert_matches!(parse(Field::dummies(["-s", "EXIT", "1"])), Err(Error::InvalidSignal(_)));
        assert_matches!(parse(Field::dummies(["-FOO", "1"])), Err(Error::UnknownOption(_)));
    }
}
