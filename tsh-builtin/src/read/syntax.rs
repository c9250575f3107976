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

//! Command line argument parser for the read built-in

use super::Command;
use crate::common::syntax::{OptionSpec, ParseError, parse_arguments};
use thiserror::Error;
use tsh_env::semantics::Field;
use tsh_syntax::parser::is_name;

const OPTION_SPECS: &[OptionSpec] = &[OptionSpec::new('r').long("raw-mode")];

/// Error in parsing command line arguments
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// An error occurred in the common parser.
    #[error(transparent)]
    CommonError(#[from] ParseError),

    /// No operand is given.
    #[error("missing operand")]
    MissingOperand,

    /// An operand is not a valid variable name.
    #[error("`{}` is not a valid variable name", .0.value)]
    InvalidVariableName(Field),
}

impl Error {
    /// Returns the argument the error is about, if any.
    #[must_use]
    pub fn field(&self) -> Option<&Field> {
        match self {
            Error::CommonError(error) => Some(error.field()),
            Error::MissingOperand => None,
            Error::InvalidVariableName(field) => Some(field),
        }
    }
}

/// Parses command line arguments.
pub fn parse(args: Vec<Field>) -> Result<Command, Error> {
    let (options, mut operands) = parse_arguments(OPTION_SPECS, args)?;
    let is_raw = !options.is_empty();

    if let Some(invalid) = operands.iter().find(|operand| !is_name(&operand.value)) {
        return Err(Error::InvalidVariableName(invalid.clone()));
    }
    let last_variable = operands.pop().ok_or(Error::MissingOperand)?;

    Ok(Command {
        is_raw,
        variables: operands,
        last_variable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn one_variable() {
        let command = parse(Field::dummies(["a"])).unwrap();
        assert_eq!(
            command,
            Command {
                is_raw: false,
                variables: vec![],
                last_variable: Field::dummy("a"),
            }
        );
    }

    #[test]
    fn raw_mode_and_many_variables() {
        let command = parse(Field::dummies(["--raw", "x", "y", "z"])).unwrap();
        assert!(command.is_raw);
        assert_eq!(command.variables, Field::dummies(["x", "y"]));
        assert_eq!(command.last_variable, Field::dummy("z"));
    }

    #[test]
    fn no_operands() {
        assert_eq!(parse(vec![]), Err(Error::MissingOperand));
        assert_eq!(parse(Field::dummies(["-r"])), Err(Error::MissingOperand));
    }

    #[test]
    fn invalid_names() {
        assert_matches!(
            parse(Field::dummies(["ok", "1x"])),
            Err(Error::InvalidVariableName(field)) if field.value == "1x"
        );
        assert_matches!(parse(Field::dummies(["-q", "a"])), Err(Error::CommonError(_)));
    }
}
