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

//! Source (`.`) built-in
//!
//! The **`.`** built-in reads and executes commands from a file.
//!
//! # Synopsis
//!
//! ```sh
//! . file [argument…]
//! ```
//!
//! # Description
//!
//! The built-in executes the contents of *file* in the current shell
//! environment. A `return` in the file ends the execution of the file, after
//! which the RETURN trap runs.
//!
//! If *arguments* are given, they become the positional parameters while the
//! file is executed. The original positional parameters are restored
//! afterwards, even if the file is abandoned by a control transfer.
//!
//! # Exit status
//!
//! The exit status of the last command executed in the file, or 1 if the
//! file cannot be read.
//!
//! # Errors
//!
//! It is an error if *file* is not specified.

use crate::Result;
use crate::common::report::report_error;
use crate::common::syntax::parse_arguments;
use crate::common::to_result;
use thiserror::Error;
use tsh_env::Env;
use tsh_env::semantics::Field;
use tsh_env::unwind::UnwindGuard;
use tsh_semantics::source_file;

/// Parsed command line of the `.` built-in
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Command {
    /// Pathname of the file to be executed
    pub file: Field,
    /// Arguments to be passed to the file
    pub params: Vec<Field>,
}

/// Error in parsing command line arguments
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// An error occurred in the common parser.
    #[error(transparent)]
    CommonError(#[from] crate::common::syntax::ParseError),

    /// The file to be executed is not specified.
    #[error("missing file operand")]
    MissingFile,
}

/// Parses command line arguments to the `.` built-in.
pub fn parse(args: Vec<Field>) -> std::result::Result<Command, Error> {
    let (_, mut operands) = parse_arguments(&[], args)?;
    if operands.is_empty() {
        return Err(Error::MissingFile);
    }
    let file = operands.remove(0);
    Ok(Command {
        file,
        params: operands,
    })
}

impl Command {
    /// Executes the file.
    pub fn execute(self, env: &mut Env) -> Result {
        if self.params.is_empty() {
            let flow = source_file(env, &self.file.value, self.file.origin);
            return to_result(env, flow);
        }

        let params = self.params.into_iter().map(|field| field.value).collect();
        let saved = env.variables.positional_params().to_vec();
        let mut guard = env.begin_frame("dot script parameters");
        guard.variables.set_positional_params(params);
        guard.protect(move |env| env.variables.set_positional_params(saved));
        let flow = source_file(&mut guard, &self.file.value, self.file.origin);
        UnwindGuard::run(guard);
        to_result(env, flow)
    }
}

/// Entry point of the `.` built-in execution
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    match parse(args) {
        Ok(command) => command.execute(env),
        Err(Error::CommonError(error)) => {
            report_error(env, Some(&error.field().origin), ".", &error)
        }
        Err(error @ Error::MissingFile) => report_error(env, None, ".", error),
    }
}
