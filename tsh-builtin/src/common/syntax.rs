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

//! Command-line argument syntax parser
//!
//! This module parses command-line arguments into options and operands
//! following the POSIX Utility Syntax Guidelines, with long options as an
//! extension.
//!
//! Create a list of [option specs](OptionSpec), each describing one possible
//! option, and pass it to [`parse_arguments`] together with the arguments.
//! Option parsing stops at the first operand or after a `--` separator. A
//! lone `-` is an operand.
//!
//! ```
//! use tsh_builtin::common::syntax::*;
//! use tsh_env::semantics::Field;
//! const SPECS: &[OptionSpec] = &[
//!     OptionSpec::new('p').long("print"),
//!     OptionSpec::new('s').argument(),
//! ];
//!
//! let arguments = Field::dummies(["-ps", "TERM", "--print", "--", "-p"]);
//! let (options, operands) = parse_arguments(SPECS, arguments).unwrap();
//! assert_eq!(options.len(), 3);
//! assert_eq!(options[0].spec.get_short(), 'p');
//! assert_eq!(options[1].spec.get_short(), 's');
//! assert_eq!(options[1].argument, Some(Field::dummy("TERM")));
//! assert_eq!(options[2].spec.get_short(), 'p');
//! assert_eq!(operands, Field::dummies(["-p"]));
//! ```

use std::iter::Peekable;
use thiserror::Error;
use tsh_env::semantics::Field;
use tsh_syntax::source::Location;

/// Specification of an option
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OptionSpec {
    short: char,
    long: Option<&'static str>,
    takes_argument: bool,
}

impl OptionSpec {
    /// Creates an option spec with the short name.
    pub const fn new(short: char) -> Self {
        OptionSpec {
            short,
            long: None,
            takes_argument: false,
        }
    }

    /// Sets the long name.
    pub const fn long(mut self, name: &'static str) -> Self {
        self.long = Some(name);
        self
    }

    /// Makes the option require an argument.
    pub const fn argument(mut self) -> Self {
        self.takes_argument = true;
        self
    }

    /// Returns the short name.
    #[must_use]
    pub const fn get_short(&self) -> char {
        self.short
    }

    /// Returns the long name.
    #[must_use]
    pub const fn get_long(&self) -> Option<&'static str> {
        self.long
    }

    /// Whether the option requires an argument.
    #[must_use]
    pub const fn takes_argument(&self) -> bool {
        self.takes_argument
    }
}

/// Occurrence of an option
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OptionOccurrence<'a> {
    /// Specification for this option
    pub spec: &'a OptionSpec,

    /// Location of the field containing this option
    pub location: Location,

    /// Argument to this option
    ///
    /// This is `Some` if and only if the option takes an argument.
    pub argument: Option<Field>,
}

/// Error in command line parsing
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseError {
    /// Short option that is not defined in the option specs
    #[error("unknown option `-{0}`")]
    UnknownShortOption(char, Field),

    /// Long option that is not defined in the option specs, or that is an
    /// ambiguous abbreviation
    #[error("unknown option `{}`", long_option_name(.0))]
    UnknownLongOption(Field),

    /// Option missing its required argument
    #[error("option `{}` missing an argument", .0.value)]
    MissingOptionArgument(Field),

    /// Long option having an unexpected argument
    #[error("option `{}` does not take an argument", long_option_name(.0))]
    UnexpectedOptionArgument(Field),
}

fn long_option_name(field: &Field) -> &str {
    match field.value.find('=') {
        Some(index) => &field.value[..index],
        None => &field.value,
    }
}

impl ParseError {
    /// Returns the field in which the error occurred.
    #[must_use]
    pub fn field(&self) -> &Field {
        match self {
            ParseError::UnknownShortOption(_, field)
            | ParseError::UnknownLongOption(field)
            | ParseError::MissingOptionArgument(field)
            | ParseError::UnexpectedOptionArgument(field) => field,
        }
    }
}

fn parse_short_options<'a, I: Iterator<Item = Field>>(
    specs: &'a [OptionSpec],
    field: Field,
    arguments: &mut Peekable<I>,
    occurrences: &mut Vec<OptionOccurrence<'a>>,
) -> Result<(), ParseError> {
    let chars = field.value.char_indices().skip(1).collect::<Vec<_>>();
    for (index, c) in chars {
        let Some(spec) = specs.iter().find(|spec| spec.short == c) else {
            return Err(ParseError::UnknownShortOption(c, field));
        };
        let location = field.origin.clone();
        if !spec.takes_argument {
            occurrences.push(OptionOccurrence {
                spec,
                location,
                argument: None,
            });
            continue;
        }

        let rest = index + c.len_utf8();
        let argument = if rest < field.value.len() {
            let mut field = field;
            field.value.drain(..rest);
            field
        } else {
            match arguments.next() {
                Some(argument) => argument,
                None => return Err(ParseError::MissingOptionArgument(field)),
            }
        };
        occurrences.push(OptionOccurrence {
            spec,
            location,
            argument: Some(argument),
        });
        return Ok(());
    }
    Ok(())
}

/// Finds the spec whose long name is `name` or uniquely starts with `name`.
fn long_match<'a>(specs: &'a [OptionSpec], name: &str) -> Option<&'a OptionSpec> {
    let mut candidates = specs
        .iter()
        .filter(|spec| spec.long.is_some_and(|long| long.starts_with(name)));
    let first = candidates.next()?;
    if first.long == Some(name) {
        return Some(first);
    }
    match candidates.next() {
        None => Some(first),
        Some(_) => specs.iter().find(|spec| spec.long == Some(name)),
    }
}

fn parse_long_option<'a, I: Iterator<Item = Field>>(
    specs: &'a [OptionSpec],
    field: Field,
    arguments: &mut Peekable<I>,
) -> Result<OptionOccurrence<'a>, ParseError> {
    let equal = field.value.find('=');
    let name = &field.value[2..equal.unwrap_or(field.value.len())];
    let Some(spec) = long_match(specs, name) else {
        return Err(ParseError::UnknownLongOption(field));
    };

    let location = field.origin.clone();
    let argument = match (spec.takes_argument, equal) {
        (false, None) => None,
        (false, Some(_)) => return Err(ParseError::UnexpectedOptionArgument(field)),
        (true, Some(index)) => {
            let mut field = field;
            field.value.drain(..=index);
            Some(field)
        }
        (true, None) => match arguments.next() {
            Some(argument) => Some(argument),
            None => return Err(ParseError::MissingOptionArgument(field)),
        },
    };
    Ok(OptionOccurrence {
        spec,
        location,
        argument,
    })
}

/// Parses command-line arguments into options and operands.
///
/// The arguments should not include the command name.
pub fn parse_arguments(
    specs: &[OptionSpec],
    arguments: Vec<Field>,
) -> Result<(Vec<OptionOccurrence<'_>>, Vec<Field>), ParseError> {
    let mut arguments = arguments.into_iter().peekable();
    let mut occurrences = Vec::new();

    while let Some(field) = arguments.next_if(|field| {
        field.value.starts_with('-') && field.value.len() > 1 && field.value != "--"
    }) {
        if field.value.starts_with("--") {
            occurrences.push(parse_long_option(specs, field, &mut arguments)?);
        } else {
            parse_short_options(specs, field, &mut arguments, &mut occurrences)?;
        }
    }
    arguments.next_if(|field| field.value == "--");

    Ok((occurrences, arguments.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SPECS: &[OptionSpec] = &[
        OptionSpec::new('l').long("list"),
        OptionSpec::new('p').long("print"),
        OptionSpec::new('s').long("signal").argument(),
    ];

    #[test]
    fn no_arguments() {
        let (options, operands) = parse_arguments(SPECS, vec![]).unwrap();
        assert_eq!(options, []);
        assert_eq!(operands, []);
    }

    #[test]
    fn operands_only() {
        let arguments = Field::dummies(["foo", "-p"]);
        let (options, operands) = parse_arguments(SPECS, arguments).unwrap();
        assert_eq!(options, []);
        assert_eq!(operands, Field::dummies(["foo", "-p"]));
    }

    #[test]
    fn single_hyphen_is_operand() {
        let arguments = Field::dummies(["-", "INT"]);
        let (options, operands) = parse_arguments(SPECS, arguments).unwrap();
        assert_eq!(options, []);
        assert_eq!(operands, Field::dummies(["-", "INT"]));
    }

    #[test]
    fn separator_is_removed() {
        let arguments = Field::dummies(["-p", "--", "--", "x"]);
        let (options, operands) = parse_arguments(SPECS, arguments).unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(operands, Field::dummies(["--", "x"]));
    }

    #[test]
    fn clustered_short_options() {
        let arguments = Field::dummies(["-lp", "x"]);
        let (options, operands) = parse_arguments(SPECS, arguments).unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].spec, &SPECS[0]);
        assert_eq!(options[1].spec, &SPECS[1]);
        assert_eq!(operands, Field::dummies(["x"]));
    }

    #[test]
    fn short_option_arguments() {
        let arguments = Field::dummies(["-sINT", "-ls", "TERM", "1"]);
        let (options, operands) = parse_arguments(SPECS, arguments).unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].argument, Some(Field::dummy("INT")));
        assert_eq!(options[1].argument, None);
        assert_eq!(options[2].argument, Some(Field::dummy("TERM")));
        assert_eq!(operands, Field::dummies(["1"]));
    }

    #[test]
    fn long_options() {
        let arguments = Field::dummies(["--print", "--sig=HUP", "--signal", "KILL"]);
        let (options, operands) = parse_arguments(SPECS, arguments).unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].spec, &SPECS[1]);
        assert_eq!(options[1].argument, Some(Field::dummy("HUP")));
        assert_eq!(options[2].argument, Some(Field::dummy("KILL")));
        assert_eq!(operands, []);
    }

    #[test]
    fn errors() {
        let result = parse_arguments(SPECS, Field::dummies(["-x"]));
        assert_matches!(result, Err(ParseError::UnknownShortOption('x', _)));

        let result = parse_arguments(SPECS, Field::dummies(["--foo"]));
        assert_matches!(
            result,
            Err(ParseError::UnknownLongOption(field)) if field.value == "--foo"
        );

        let result = parse_arguments(SPECS, Field::dummies(["-s"]));
        assert_matches!(result, Err(ParseError::MissingOptionArgument(_)));

        let result = parse_arguments(SPECS, Field::dummies(["--list=1"]));
        let error = result.unwrap_err();
        assert_eq!(error.to_string(), "option `--list` does not take an argument");
    }
}
