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

//! Command line argument parser for the shell
//!
//! ```sh
//! tsh [-eEimtT] [-o option]… [file [argument…]]
//! tsh -c [-eEimtT] [-o option]… command [name [argument…]]
//! ```
//!
//! Options starting with `+` instead of `-` turn the shell options off. Long
//! options may be given as `--option` or `++option`. The `--version` option
//! prints the version and exits.

use std::iter::Peekable;
use thiserror::Error;
use tsh_env::option::{FromStrError, Option as ShellOption, State, parse_long, parse_short};

/// Source of the commands the shell runs
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source {
    /// Read from the standard input
    Stdin,
    /// Read from the script file
    File { path: String },
    /// Run the command string given with `-c`
    String(String),
}

/// Configuration of the shell run
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Run {
    /// Shell options to be set
    pub options: Vec<(ShellOption, State)>,
    /// Source of the commands
    pub source: Source,
    /// Value of `$0`
    pub arg0: String,
    /// Initial positional parameters
    pub positional_params: Vec<String>,
}

/// Result of parsing the command line
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Parse {
    /// Print the version and exit
    Version,
    /// Run the shell
    Run(Run),
}

/// Error in the command line
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Short option that is not defined
    #[error("-{0}: unknown option")]
    UnknownShortOption(char),
    /// Long option that is not defined
    #[error("{0}: unknown option")]
    UnknownLongOption(String),
    /// Long option that matches more than one option name
    #[error("{0}: ambiguous option")]
    AmbiguousLongOption(String),
    /// `-o` or `+o` not followed by an option name
    #[error("{0}: missing option name")]
    MissingOptionArgument(String),
    /// `-c` without a command string
    #[error("-c: missing command string")]
    MissingCommandString,
}

fn long_option(name: &str, negate: bool, arg: &str) -> Result<(ShellOption, State), Error> {
    match parse_long(name) {
        Ok((option, state)) => Ok((option, if negate { !state } else { state })),
        Err(FromStrError::NoSuchOption) => Err(Error::UnknownLongOption(arg.to_owned())),
        Err(FromStrError::Ambiguous) => Err(Error::AmbiguousLongOption(arg.to_owned())),
    }
}

struct Options {
    options: Vec<(ShellOption, State)>,
    command_string: bool,
    version: bool,
}

/// Parses one option argument, returning false if it is not an option.
fn parse_option<I: Iterator<Item = String>>(
    args: &mut Peekable<I>,
    result: &mut Options,
) -> Result<bool, Error> {
    let Some(arg) = args.next_if(|arg| {
        arg.len() > 1 && (arg.starts_with('-') || arg.starts_with('+')) && arg != "--"
    }) else {
        return Ok(false);
    };

    if arg == "--version" {
        result.version = true;
        return Ok(true);
    }
    if let Some(name) = arg.strip_prefix("--").or_else(|| arg.strip_prefix("++")) {
        let negate = arg.starts_with('+');
        result.options.push(long_option(name, negate, &arg)?);
        return Ok(true);
    }

    let negate = arg.starts_with('+');
    let chars = arg[1..].chars().collect::<Vec<_>>();
    for (index, &c) in chars.iter().enumerate() {
        match c {
            'c' if !negate => result.command_string = true,
            'o' => {
                let rest = chars[index + 1..].iter().collect::<String>();
                let name = if rest.is_empty() {
                    args.next()
                        .ok_or_else(|| Error::MissingOptionArgument(arg.clone()))?
                } else {
                    rest
                };
                result.options.push(long_option(&name, negate, &name)?);
                break;
            }
            _ => {
                let (option, state) = parse_short(c).ok_or(Error::UnknownShortOption(c))?;
                result.options.push((option, if negate { !state } else { state }));
            }
        }
    }
    Ok(true)
}

/// Parses the command line arguments, including the shell name.
pub fn parse<I>(args: I) -> Result<Parse, Error>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let shell_name = args.next().unwrap_or_else(|| "tsh".to_owned());
    let mut args = args.peekable();

    let mut options = Options {
        options: Vec::new(),
        command_string: false,
        version: false,
    };
    while parse_option(&mut args, &mut options)? {}
    if options.version {
        return Ok(Parse::Version);
    }
    args.next_if(|arg| arg == "--");

    let (source, arg0) = if options.command_string {
        let command = args.next().ok_or(Error::MissingCommandString)?;
        let arg0 = args.next().unwrap_or(shell_name);
        (Source::String(command), arg0)
    } else {
        match args.next() {
            Some(path) => (Source::File { path: path.clone() }, path),
            None => (Source::Stdin, shell_name),
        }
    };

    Ok(Parse::Run(Run {
        options: options.options,
        source,
        arg0,
        positional_params: args.collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tsh_env::option::{ErrExit, FuncTrace, History, Interactive, Monitor, Off, On};

    fn parse_strs(args: &[&str]) -> Result<Parse, Error> {
        parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn no_arguments() {
        assert_eq!(
            parse_strs(&["tsh"]),
            Ok(Parse::Run(Run {
                options: vec![],
                source: Source::Stdin,
                arg0: "tsh".to_string(),
                positional_params: vec![],
            }))
        );
    }

    #[test]
    fn command_string() {
        assert_eq!(
            parse_strs(&["tsh", "-ec", "echo $0 $1", "name", "one"]),
            Ok(Parse::Run(Run {
                options: vec![(ErrExit, On)],
                source: Source::String("echo $0 $1".to_string()),
                arg0: "name".to_string(),
                positional_params: vec!["one".to_string()],
            }))
        );
        assert_eq!(parse_strs(&["tsh", "-c"]), Err(Error::MissingCommandString));
    }

    #[test]
    fn script_file() {
        assert_matches!(
            parse_strs(&["tsh", "-i", "+m", "--", "script", "-x"]),
            Ok(Parse::Run(run)) => {
                assert_eq!(run.options, [(Interactive, On), (Monitor, Off)]);
                assert_eq!(run.source, Source::File { path: "script".to_string() });
                assert_eq!(run.arg0, "script");
                assert_eq!(run.positional_params, ["-x"]);
            }
        );
    }

    #[test]
    fn long_options() {
        assert_matches!(
            parse_strs(&["tsh", "-o", "functrace", "+ohistory", "--noerrexit"]),
            Ok(Parse::Run(run)) => {
                assert_eq!(
                    run.options,
                    [(FuncTrace, On), (History, Off), (ErrExit, Off)]
                );
            }
        );
        assert_eq!(parse_strs(&["tsh", "--version"]), Ok(Parse::Version));
    }

    #[test]
    fn errors() {
        assert_eq!(parse_strs(&["tsh", "-x"]), Err(Error::UnknownShortOption('x')));
        assert_eq!(
            parse_strs(&["tsh", "--vi"]),
            Err(Error::UnknownLongOption("--vi".to_string()))
        );
        assert_eq!(
            parse_strs(&["tsh", "-o"]),
            Err(Error::MissingOptionArgument("-o".to_string()))
        );
    }
}
