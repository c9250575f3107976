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

//! Minimal shell command grammar for tsh.
//!
//! This crate provides just enough of the shell language to drive the trap
//! engine: simple commands made of words, parameter expansions, quoting, and
//! function definitions whose bodies are kept as raw text.
//!
//! - The [`source`] module describes where code comes from.
//! - The [`input`] module defines the line-oriented [`Input`](input::Input)
//!   trait the parser reads from.
//! - The [`syntax`] module defines the abstract syntax tree.
//! - The [`parser`] module converts source code into [`Command`](syntax::Command)s.

pub mod input;
pub mod parser;
pub mod source;
pub mod syntax;
