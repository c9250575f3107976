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

//! Implementation of the shell language semantics for tsh.
//!
//! This crate runs parsed commands in an [`Env`](tsh_env::Env) and carries
//! out the traps recorded in the environment:
//!
//! - The [`runner`] module reads and evaluates source code. It defines
//!   [`evaluate`], the primitive on which the `eval` and `.` built-ins, trap
//!   actions, function calls and the top-level [`read_eval_loop`] are built.
//! - The [`command`] module executes a single [`Command`](tsh_syntax::syntax::Command).
//! - The [`trap`] module runs trap actions at safe points and on shell
//!   exit.
//!
//! Control transfers such as `return` and `exit` travel up the call chain as
//! the `Break` value of [`Result`]. Each evaluator decides which transfers it
//! catches.

pub mod command;
mod handle;
pub mod runner;
pub mod trap;


pub use self::command::execute;
pub use self::handle::Handle;
pub use self::runner::{
    EvalFlags, ReadEvalLoop, eval_string, evaluate, read_eval_loop, source_file,
};
pub use self::trap::{
    ReturnKind, run_debug_trap, run_err_trap, run_exit_trap, run_pending_traps, run_return_trap,
    run_trap,
};
#[doc(no_inline)]
pub use tsh_env::semantics::*;
