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

//! Command line argument parser for the set built-in

use super::Command;
use std::iter::Peekable;
use thiserror::Error;
use tsh_env::option::FromStrError::*;
use tsh_env::option::State;
use tsh_env::option::parse_long;
use tsh_env::option::parse_short;
use tsh_env::semantics::Field;

type OptionOccurrence = (tsh_env::option::Option, State);

/// Error in command line parsing
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Short option that is not defined
    #[error("unknown option {0:?}")]
    UnknownShortOption(char, Field),

    /// Long option that is not defined
    #[error("unknown option {:?}", .0.value)]
    UnknownLongOption(Field),

    /// Long option that matches the prefix of more than one option name
    #[error("ambiguous option name {:?}", .0.value)]
    AmbiguousLongOption(Field),

    /// `-o` or `+o` used without an option name
    #[error("option {:?} missing an argument", .0.value)]
    MissingOptionArgument(Field),

    /// Short option that is not modifiable by the set built-in
    #[error("option {0:?} not modifiable by the set built-in")]
    UnmodifiableShortOption(char, Field),

    /// Long option that is not modifiable by the set built-in
    #[error("option {:?} not modifiable by the set built-in", .0.value)]
    UnmodifiableLongOption(Field),
}

impl Error {
    /// Returns a reference to the field in which the error occurred.
    #[must_use]
    pub fn field(&self) -> &Field {
        match self {
            Error::UnknownShortOption(_, field)
            | Error::UnknownLongOption(field)
            | Error::AmbiguousLongOption(field)
            | Error::MissingOptionArgument(field)
            | Error::UnmodifiableShortOption(_, field)
            | Error::UnmodifiableLongOption(field) => field,
        }
    }
}

fn apply_negation((option, state): OptionOccurrence, negate: bool) -> OptionOccurrence {
    (option, if negate { !state } else { state })
}

fn long_option(name: &str, field: Field, negate: bool) -> Result<OptionOccurrence, Error> {
    match parse_long(name) {
        Ok((option, state)) if option.is_modifiable() => {
            Ok(apply_negation((option, state), negate))
        }
        Ok(_) => Err(Error::UnmodifiableLongOption(field)),
        Err(NoSuchOption) => Err(Error::UnknownLongOption(field)),
        Err(Ambiguous) => Err(Error::AmbiguousLongOption(field)),
    }
}

/// Tries to parse the next field in `args` as a group of short options.
///
/// Returns `Ok(true)` if the next field contained short options, in which
/// case the parsed field is consumed from the iterator.
fn try_parse_short<I: Iterator<Item = Field>>(
    args: &mut Peekable<I>,
    option_occurrences: &mut Vec<OptionOccurrence>,
) -> Result<bool, Error> {
    let negate = match args.peek().map(|field| field.value.as_bytes()) {
        Some([b'-', second, ..]) if *second != b'-' => false,
        Some([b'+', second, ..]) if *second != b'+' => true,
        _ => return Ok(false),
    };
    let Some(field) = args.next() else {
        return Ok(false);
    };

    let chars = field.value[1..].chars().collect::<Vec<_>>();
    for (index, &c) in chars.iter().enumerate() {
        if c == 'o' {
            let rest = chars[index + 1..].iter().collect::<String>();
            let occurrence = if rest.is_empty() {
                let name = args
                    .next()
                    .ok_or_else(|| Error::MissingOptionArgument(field.clone()))?;
                let value = name.value.clone();
                long_option(&value, name, negate)?
            } else {
                long_option(&rest, field.clone(), negate)?
            };
            option_occurrences.push(occurrence);
            break;
        }

        match parse_short(c) {
            Some((option, state)) if option.is_modifiable() => {
                option_occurrences.push(apply_negation((option, state), negate))
            }
            Some(_) => return Err(Error::UnmodifiableShortOption(c, field)),
            None => return Err(Error::UnknownShortOption(c, field)),
        }
    }
    Ok(true)
}

/// Tries to parse and consume the next field in `args` as a long option.
fn try_parse_long<I: Iterator<Item = Field>>(
    args: &mut Peekable<I>,
) -> Result<Option<OptionOccurrence>, Error> {
    let (name, negate) = match args.peek() {
        Some(field) => match (field.value.strip_prefix("--"), field.value.strip_prefix("++")) {
            (Some(""), _) | (None, None) => return Ok(None),
            (Some(name), _) => (name.to_owned(), false),
            (None, Some(name)) => (name.to_owned(), true),
        },
        None => return Ok(None),
    };
    let Some(field) = args.next() else {
        return Ok(None);
    };
    long_option(&name, field, negate).map(Some)
}

/// Parses command line arguments.
pub fn parse(args: Vec<Field>) -> Result<Command, Error> {
    if args.is_empty() {
        return Ok(Command::PrintVariables);
    }
    if let [only] = args.as_slice() {
        match only.value.as_str() {
            "-o" => return Ok(Command::PrintOptionsHumanReadable),
            "+o" => return Ok(Command::PrintOptionsMachineReadable),
            _ => (),
        }
    }

    let mut args = args.into_iter().peekable();
    let mut options = Vec::new();
    loop {
        if try_parse_short(&mut args, &mut options)? {
            continue;
        }
        match try_parse_long(&mut args)? {
            Some(occurrence) => options.push(occurrence),
            None => break,
        }
    }

    let separated = args
        .next_if(|arg| arg.value == "--" || arg.value == "-")
        .is_some();
    let positional_params = (separated || args.peek().is_some()).then(|| args.collect());

    Ok(Command::Modify {
        options,
        positional_params,
    })
}
