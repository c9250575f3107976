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

//! Echo built-in
//!
//! The **`echo`** built-in prints its operands separated by spaces and
//! followed by a newline.
//!
//! # Synopsis
//!
//! ```sh
//! echo [-n] [operand…]
//! ```
//!
//! # Options
//!
//! If the first argument is exactly `-n`, the trailing newline is not
//! printed. No other options are recognized, and backslashes are printed
//! literally.
//!
//! # Exit status
//!
//! Zero.

use crate::Result;
use itertools::Itertools;
use tsh_env::Env;
use tsh_env::semantics::Field;

/// Entry point of the `echo` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let (newline, operands) = match args.split_first() {
        Some((first, rest)) if first.value == "-n" => (false, rest),
        _ => (true, &args[..]),
    };
    let mut text = operands.iter().map(|field| &field.value).join(" ");
    if newline {
        text.push('\n');
    }
    env.print(&text);
    Result::default()
}
