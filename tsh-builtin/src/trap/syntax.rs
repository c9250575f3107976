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

//! Command line argument parser for the trap built-in

use super::Command;
use crate::common::syntax::{OptionOccurrence, OptionSpec};
use itertools::Itertools;
use std::str::FromStr;
use thiserror::Error;
use tsh_env::semantics::Field;
use tsh_env::trap::{Action, Condition};

/// Command line options for the trap built-in
pub const OPTION_SPECS: &[OptionSpec] = &[
    OptionSpec::new('l').long("list"),
    OptionSpec::new('p').long("print"),
];

/// Error that may occur while [interpreting](interpret) command line arguments.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The specified condition is not supported.
    #[error("{}: invalid signal specification", .0.value)]
    UnknownCondition(Field),

    /// An action is specified but no condition is specified.
    #[error("missing condition for action `{}`", .action.value)]
    MissingCondition { action: Field },
}

impl Error {
    /// Returns the argument the error is about.
    #[must_use]
    pub fn field(&self) -> &Field {
        match self {
            Error::UnknownCondition(field) => field,
            Error::MissingCondition { action } => action,
        }
    }
}

/// Parses a single condition from a command line operand.
///
/// A condition can be `0` or `EXIT` for [`Condition::Exit`], a signal name
/// (case-insensitive, with or without the `SIG` prefix) or number, or one
/// of `DEBUG`, `ERR` and `RETURN`.
fn parse_condition(field: Field) -> Result<(Condition, Field), Error> {
    match Condition::from_str(&field.value) {
        Ok(cond) => Ok((cond, field)),
        Err(_) => Err(Error::UnknownCondition(field)),
    }
}

fn is_non_negative_integer(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Converts parsed command line arguments into a `Command`.
///
/// The result of [`parse_arguments`](crate::common::syntax::parse_arguments)
/// should be passed to this function.
///
/// If the first operand is an unsigned integer, all operands are taken as
/// conditions to be reset to the default action.
///
/// On failure, returns a non-empty list of errors.
pub fn interpret(
    options: Vec<OptionOccurrence<'_>>,
    operands: Vec<Field>,
) -> Result<Command, Vec<Error>> {
    let mut print = false;
    for option in &options {
        match option.spec.get_short() {
            'l' => return Ok(Command::ListSignals),
            'p' => print = true,
            _ => (),
        }
    }

    let mut operands = operands.into_iter().peekable();

    let action_field = operands
        .next_if(|field| !print && !is_non_negative_integer(&field.value))
        .map(|field| {
            let action = match field.value.as_str() {
                "-" => Action::Default,
                "" => Action::Ignore,
                command => Action::Command(command.into()),
            };
            (action, field)
        });

    let (conditions, errors): (Vec<_>, Vec<_>) =
        operands.map(parse_condition).partition_result();

    if !errors.is_empty() {
        return Err(errors);
    }
    if print {
        return Ok(if conditions.is_empty() {
            Command::PrintAll {
                include_default: true,
            }
        } else {
            Command::Print { conditions }
        });
    }

    match (conditions.is_empty(), action_field) {
        (true, None) => Ok(Command::PrintAll {
            include_default: false,
        }),
        (true, Some((_, action))) => Err(vec![Error::MissingCondition { action }]),
        (false, action) => {
            let origin = match &action {
                Some((_, field)) => field.origin.clone(),
                None => conditions[0].1.origin.clone(),
            };
            let action = action.map(|(action, _)| action).unwrap_or_default();
            Ok(Command::SetAction {
                action,
                conditions,
                origin,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::syntax::parse_arguments;
    use assert_matches::assert_matches;
    use tsh_env::signal::Number;

    fn parse(args: &[&str]) -> Result<Command, Vec<Error>> {
        let arguments = Field::dummies(args.iter().copied());
        let (options, operands) = parse_arguments(OPTION_SPECS, arguments).unwrap();
        interpret(options, operands)
    }

    #[test]
    fn no_arguments() {
        assert_eq!(
            parse(&[]),
            Ok(Command::PrintAll {
                include_default: false
            })
        );
        assert_eq!(
            parse(&["-p"]),
            Ok(Command::PrintAll {
                include_default: true
            })
        );
        assert_eq!(parse(&["-l"]), Ok(Command::ListSignals));
    }

    #[test]
    fn setting_command() {
        assert_matches!(
            parse(&["echo hi", "int", "SIGTERM", "0"]),
            Ok(Command::SetAction { action, conditions, .. }) => {
                assert_eq!(action, Action::Command("echo hi".into()));
                let conditions = conditions.iter().map(|(cond, _)| *cond).collect::<Vec<_>>();
                assert_eq!(
                    conditions,
                    [
                        Condition::Signal(Number::SIGINT),
                        Condition::Signal(Number::SIGTERM),
                        Condition::Exit,
                    ]
                );
            }
        );
    }

    #[test]
    fn special_actions() {
        assert_matches!(
            parse(&["-", "INT"]),
            Ok(Command::SetAction { action: Action::Default, .. })
        );
        assert_matches!(
            parse(&["", "INT"]),
            Ok(Command::SetAction { action: Action::Ignore, .. })
        );
    }

    #[test]
    fn leading_number_resets() {
        assert_matches!(
            parse(&["2", "15"]),
            Ok(Command::SetAction { action: Action::Default, conditions, .. }) => {
                assert_eq!(conditions.len(), 2);
            }
        );
    }

    #[test]
    fn printing_specific_conditions() {
        assert_matches!(
            parse(&["-p", "INT", "EXIT"]),
            Ok(Command::Print { conditions }) => assert_eq!(conditions.len(), 2)
        );
    }

    #[test]
    fn errors() {
        assert_matches!(
            parse(&["echo", "FOO", "BAR"]),
            Err(errors) => assert_eq!(errors.len(), 2)
        );
        assert_matches!(
            parse(&["echo"]),
            Err(errors) => assert_matches!(errors[..], [Error::MissingCondition { .. }])
        );
    }
}
