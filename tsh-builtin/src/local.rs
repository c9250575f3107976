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

//! Local built-in
//!
//! The **`local`** built-in defines variables local to the current function.
//!
//! # Synopsis
//!
//! ```sh
//! local name[=value]…
//! ```
//!
//! # Description
//!
//! Each operand defines a variable in the context of the innermost function
//! call. An operand of the form `name=value` sets the value. An operand
//! without `=` keeps the value the variable currently has, or sets it empty
//! if the variable is not set. The local variables disappear when the
//! function returns, revealing the variables they hid.
//!
//! # Errors
//!
//! It is an error to use the built-in outside a function. An operand whose
//! name part is not a valid variable name is also an error.
//!
//! # Exit status
//!
//! Zero on success, one outside a function and two for an invalid operand.

use crate::common::report::{report_error, report_failure};
use crate::common::syntax::parse_arguments;
use tsh_env::Env;
use tsh_env::semantics::Field;
use tsh_syntax::parser::is_name;

/// Entry point for executing the `local` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> crate::Result {
    let operands = match parse_arguments(&[], args) {
        Ok((_, operands)) => operands,
        Err(error) => return report_error(env, Some(&error.field().origin), "local", &error),
    };

    if !env.stack.in_function() {
        return report_failure(env, None, "local", "not in a function");
    }

    if let Some(invalid) = operands.iter().find(|operand| {
        let name = operand.value.split_once('=').map_or(&*operand.value, |(name, _)| name);
        !is_name(name)
    }) {
        let message = format!("`{}` is not a valid variable name", invalid.value);
        return report_error(env, Some(&invalid.origin), "local", message);
    }

    for operand in operands {
        let (name, value) = match operand.value.split_once('=') {
            Some((name, value)) => (name.to_owned(), value.to_owned()),
            None => {
                let value = env.variables.get(&operand.value).unwrap_or_default();
                (operand.value.clone(), value.to_owned())
            }
        };
        env.variables.local(name, value);
    }
    crate::Result::default()
}
