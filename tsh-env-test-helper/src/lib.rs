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

//! This crate contains utility functions for use in tests that interact with
//! the shell environment ([`tsh_env::Env`]).

use std::cell::RefCell;
use std::rc::Rc;
use tsh_env::Env;
use tsh_env::system::r#virtual::{SystemState, VirtualSystem};

/// Creates an environment backed by a fresh [`VirtualSystem`].
///
/// The returned system shares its state with the one in the environment, so
/// tests can deliver signals and inspect output through it.
#[must_use]
pub fn virtual_env() -> (Env, VirtualSystem) {
    let system = VirtualSystem::new();
    let env = Env::with_system(Rc::new(system.clone()));
    (env, system)
}

/// Helper function for asserting on the content of the standard output
///
/// The argument function `f` is called with everything written to the
/// standard output of the virtual system so far.
///
/// # Example
///
/// ```
/// # use tsh_env_test_helper::{assert_stdout, virtual_env};
/// let (env, system) = virtual_env();
/// env.print("Hello, world!\n");
/// assert_stdout(&system.state, |stdout| assert_eq!(stdout, "Hello, world!\n"));
/// ```
pub fn assert_stdout<F, T>(state: &RefCell<SystemState>, f: F) -> T
where
    F: FnOnce(&str) -> T,
{
    f(&state.borrow().stdout)
}

/// Helper function for asserting on the content of the standard error
///
/// This function is analogous to [`assert_stdout`].
pub fn assert_stderr<F, T>(state: &RefCell<SystemState>, f: F) -> T
where
    F: FnOnce(&str) -> T,
{
    f(&state.borrow().stderr)
}
