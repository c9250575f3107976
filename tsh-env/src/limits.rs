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

//! Configurable bounds on nesting

use crate::trap::DEFAULT_CEILING;

/// Default maximum nesting of `eval`, `.`, function calls and traps
pub const DEFAULT_EVAL_DEPTH: usize = 1000;

/// Bounds on nesting
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Limits {
    /// Maximum number of nested trap runs, or `None` for no limit
    pub trap_recursion_ceiling: Option<usize>,
    /// Maximum number of nested evaluations
    pub eval_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            trap_recursion_ceiling: Some(DEFAULT_CEILING),
            eval_depth: DEFAULT_EVAL_DEPTH,
        }
    }
}
