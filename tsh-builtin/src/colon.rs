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

//! Colon (`:`) built-in
//!
//! The colon (**`:`**) built-in does nothing and ignores its arguments.
//!
//! # Synopsis
//!
//! ```sh
//! : […]
//! ```
//!
//! # Exit status
//!
//! Zero.

use crate::Result;
use tsh_env::Env;
use tsh_env::semantics::Field;

/// Entry point for executing the `:` built-in
pub fn main(_env: &mut Env, _args: Vec<Field>) -> Result {
    Result::default()
}
