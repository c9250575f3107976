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

//! Type definitions for built-in utilities.
//!
//! This module provides data types for defining built-in utilities.
//!
//! Note that concrete implementations of built-ins are not included in the
//! `tsh_env` crate. For implementations of specific built-ins like `trap` and
//! `eval`, see the `tsh_builtin` crate.

use crate::Env;
use crate::semantics::{Divert, ExitStatus, Field};
use std::fmt::Debug;

/// Types of built-in utilities.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Type {
    /// Special built-in.
    ///
    /// Special built-in utilities cannot be overridden by functions.
    Special,

    /// Regular built-in.
    Regular,
}

/// Result of built-in utility execution.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[must_use]
pub struct Result {
    exit_status: ExitStatus,
    divert: Option<Divert>,
}

impl Result {
    /// Creates a new result with the exit status and no divert.
    pub const fn new(exit_status: ExitStatus) -> Self {
        Result {
            exit_status,
            divert: None,
        }
    }

    /// Creates a new result with the exit status and divert.
    pub const fn with_exit_status_and_divert(
        exit_status: ExitStatus,
        divert: Option<Divert>,
    ) -> Self {
        Result {
            exit_status,
            divert,
        }
    }

    /// Returns the exit status of the built-in.
    #[must_use]
    pub const fn exit_status(&self) -> ExitStatus {
        self.exit_status
    }

    /// Returns the divert requested by the built-in.
    #[must_use]
    pub const fn divert(&self) -> Option<Divert> {
        self.divert
    }
}

impl From<ExitStatus> for Result {
    fn from(exit_status: ExitStatus) -> Self {
        Result::new(exit_status)
    }
}

/// Type of functions that implement the behavior of a built-in.
pub type Main = fn(&mut Env, Vec<Field>) -> Result;

/// Built-in utility definition.
#[derive(Clone, Copy)]
pub struct Builtin {
    /// Type of the built-in.
    pub r#type: Type,
    /// Function that implements the behavior of the built-in.
    pub execute: Main,
}

impl Builtin {
    /// Creates a new built-in utility definition.
    pub const fn new(r#type: Type, execute: Main) -> Self {
        Builtin { r#type, execute }
    }
}

impl Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin")
            .field("type", &self.r#type)
            .finish_non_exhaustive()
    }
}
