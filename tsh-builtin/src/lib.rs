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

//! Implementation of the shell built-in utilities of tsh.
//!
//! Each built-in utility is implemented in the submodule named after the
//! utility. The submodule contains the `main` function that implements the
//! built-in utility. The module documentation for each submodule describes
//! the behavior of the built-in utility.
//!
//! The built-ins in this crate are those that manage traps and transfer
//! control: [`trap`], [`exit`], [`return`](mod@r#return), [`eval`],
//! [`source`] (`.`), [`read`] and [`kill`], plus a few small utilities the
//! shell cannot be exercised without.
//!
//! The [`common`] module provides common functions that are used for
//! implementing built-in utilities.
//!
//! To make the built-ins available in an environment, copy [`BUILTINS`] into
//! [`Env::builtins`](tsh_env::Env::builtins):
//!
//! ```
//! # use tsh_env::Env;
//! let mut env = Env::new_virtual();
//! env.builtins.extend(tsh_builtin::BUILTINS.iter().copied());
//! assert!(env.builtins.contains_key("trap"));
//! ```

pub mod colon;
pub mod common;
pub mod echo;
pub mod eval;
pub mod exit;
pub mod r#false;
pub mod kill;
pub mod local;
pub mod read;
pub mod r#return;
pub mod set;
pub mod source;
pub mod trap;
pub mod r#true;

#[doc(no_inline)]
pub use tsh_env::builtin::*;

use Type::{Regular, Special};

/// Array of all the implemented built-in utilities.
///
/// The array items are ordered alphabetically.
pub const BUILTINS: &[(&str, Builtin)] = &[
    (".", Builtin::new(Special, source::main)),
    (":", Builtin::new(Special, colon::main)),
    ("echo", Builtin::new(Regular, echo::main)),
    ("eval", Builtin::new(Special, eval::main)),
    ("exit", Builtin::new(Special, exit::main)),
    ("false", Builtin::new(Regular, r#false::main)),
    ("kill", Builtin::new(Regular, kill::main)),
    ("local", Builtin::new(Regular, local::main)),
    ("read", Builtin::new(Regular, read::main)),
    ("return", Builtin::new(Special, r#return::main)),
    ("set", Builtin::new(Special, set::main)),
    ("trap", Builtin::new(Special, trap::main)),
    ("true", Builtin::new(Regular, r#true::main)),
];
