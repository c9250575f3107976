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

//! Reading input for the read built-in
//!
//! The built-in waits for input in an interruptible state. When the wait is
//! broken by a signal, pending traps are run before deciding whether to go
//! on reading: `SIGINT` and signals that have a trap command end the read,
//! while other signals are ignored.

use std::ops::ControlFlow::{Break, Continue};
use thiserror::Error;
use tsh_env::Env;
use tsh_env::semantics::Result as FlowResult;
use tsh_env::signal::Number;
use tsh_env::system::{Errno, Fd};
use tsh_env::unwind::UnwindGuard;
use tsh_semantics::run_pending_traps;

/// Character read from the input, possibly quoted by a backslash
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QuotedChar {
    /// Character value
    pub value: char,
    /// Whether the character was preceded by a backslash
    pub is_quoted: bool,
}

/// Result of a successful read
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Input {
    /// Characters read, without the terminating newline
    pub chars: Vec<QuotedChar>,
    /// Whether the line was terminated by a newline (as opposed to the end
    /// of input)
    pub newline_found: bool,
}

/// Error that ends reading
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// The standard input could not be read.
    #[error("cannot read the standard input: {0}")]
    Io(Errno),
    /// The wait was interrupted by the signal.
    #[error("interrupted by {0}")]
    Interrupted(Number),
}

enum Wait {
    Line(Option<String>),
    Retry,
}

/// Classifies the signal that broke the wait, if it should end the read.
fn interrupting_signal(env: &Env) -> Option<Number> {
    let pending = env.system.pending();
    if pending.take_immediate() || pending.has_interrupt() {
        return Some(Number::SIGINT);
    }
    pending
        .signals()
        .into_iter()
        .find(|&signal| env.traps.is_trapped(signal.into()))
}

fn read_physical_line(env: &mut Env) -> FlowResult<std::result::Result<Wait, Error>> {
    let pending_interruptible = env.system.pending().set_interruptible(true);
    let result = env.system.read_line(Fd::STDIN);
    env.system.pending().set_interruptible(pending_interruptible);

    match result {
        Ok(line) => Continue(Ok(Wait::Line(line))),
        Err(Errno::EINTR) => {
            let signal = interrupting_signal(env);
            run_pending_traps(env)?;
            match signal {
                Some(signal) => Continue(Err(Error::Interrupted(signal))),
                None => Continue(Ok(Wait::Retry)),
            }
        }
        Err(errno) => Continue(Err(Error::Io(errno))),
    }
}

/// Appends the characters of a line, returning whether the line ends with a
/// line continuation.
fn push_line(chars: &mut Vec<QuotedChar>, line: &str, is_raw: bool) -> bool {
    if is_raw {
        chars.extend(line.chars().map(|value| QuotedChar {
            value,
            is_quoted: false,
        }));
        return false;
    }

    let mut iter = line.chars();
    while let Some(c) = iter.next() {
        if c != '\\' {
            chars.push(QuotedChar {
                value: c,
                is_quoted: false,
            });
            continue;
        }
        match iter.next() {
            Some(value) => chars.push(QuotedChar {
                value,
                is_quoted: true,
            }),
            None => return true,
        }
    }
    false
}

/// Reads a logical line from the standard input.
///
/// Without `is_raw`, a backslash quotes the next character and a trailing
/// backslash joins the next physical line.
///
/// The interruptible state of the pending trap queue is restored even if a
/// trap diverts.
pub fn read(env: &mut Env, is_raw: bool) -> FlowResult<std::result::Result<Input, Error>> {
    let mut env = env.begin_frame("read");
    let previous = env.system.pending().set_interruptible(false);
    env.protect(move |env| {
        env.system.pending().set_interruptible(previous);
    });
    // A stale interrupt from before the read does not count.
    env.system.pending().take_immediate();

    let mut input = Input::default();
    let result = loop {
        let line = match read_physical_line(&mut env) {
            Continue(Ok(Wait::Line(line))) => line,
            Continue(Ok(Wait::Retry)) => continue,
            Continue(Err(error)) => break Err(error),
            Break(divert) => return Break(divert),
        };
        let Some(line) = line else {
            break Ok(());
        };
        if !push_line(&mut input.chars, &line, is_raw) {
            input.newline_found = true;
            break Ok(());
        }
    };

    UnwindGuard::run(env);
    Continue(result.map(|()| input))
}
