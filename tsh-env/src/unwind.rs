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

//! Cleanup actions run when a [`Divert`](crate::semantics::Divert) unwinds
//! through an operation
//!
//! An operation that temporarily modifies the environment opens a frame with
//! [`Env::begin_frame`] and registers closures that undo the modifications
//! with [`UnwindGuard::protect`]. When the operation completes normally, it
//! either runs the frame with [`UnwindGuard::run`] or closes it without
//! running with [`UnwindGuard::discard`]. When the operation is abandoned
//! because of a `Divert`, the guard is simply dropped on the way out, which
//! runs the closures in reverse order of registration.
//!
//! Frames are strictly nested. Every frame is closed exactly once.
//!
//! ```
//! # use tsh_env::Env;
//! # use tsh_env::semantics::ExitStatus;
//! # use tsh_env::unwind::UnwindGuard;
//! let mut env = Env::new_virtual();
//! let mut guard = env.begin_frame("example");
//! let saved = guard.exit_status;
//! guard.protect(move |env| env.exit_status = saved);
//! guard.exit_status = ExitStatus(42);
//! UnwindGuard::run(guard);
//! assert_eq!(env.exit_status, ExitStatus::SUCCESS);
//! assert_eq!(env.unwind.depth(), 0);
//! ```

use crate::Env;
use std::fmt;
use std::ops::{Deref, DerefMut};

type Cleanup = Box<dyn FnOnce(&mut Env)>;

struct UnwindFrame {
    tag: &'static str,
    entries: Vec<Cleanup>,
}

/// Stack of open unwind frames
#[derive(Default)]
pub struct UnwindStack {
    frames: Vec<UnwindFrame>,
    opened: usize,
    closed: usize,
}

impl fmt::Debug for UnwindStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags = self.frames.iter().map(|frame| frame.tag);
        f.debug_struct("UnwindStack")
            .field("frames", &tags.collect::<Vec<_>>())
            .field("opened", &self.opened)
            .field("closed", &self.closed)
            .finish()
    }
}

impl UnwindStack {
    /// Returns the number of open frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns the total number of frames ever opened.
    #[must_use]
    pub fn opened(&self) -> usize {
        self.opened
    }

    /// Returns the total number of frames ever closed.
    #[must_use]
    pub fn closed(&self) -> usize {
        self.closed
    }

    /// Returns the tag of the innermost open frame.
    #[must_use]
    pub fn top_tag(&self) -> Option<&'static str> {
        self.frames.last().map(|frame| frame.tag)
    }

    fn close(&mut self, tag: &'static str, depth: usize) -> Vec<Cleanup> {
        debug_assert_eq!(self.frames.len(), depth, "unwind frame {tag:?} closed out of order");
        let frame = self.frames.pop();
        self.closed += 1;
        match frame {
            Some(frame) => {
                debug_assert_eq!(frame.tag, tag, "unwind frame tag mismatch");
                frame.entries
            }
            None => Vec::new(),
        }
    }
}

/// Guard of an open unwind frame
///
/// The guard is created by [`Env::begin_frame`] and dereferences to the
/// environment. Dropping the guard runs the frame.
#[must_use = "the frame is run when the guard is dropped"]
pub struct UnwindGuard<'a> {
    env: &'a mut Env,
    tag: &'static str,
    depth: usize,
}

impl fmt::Debug for UnwindGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnwindGuard")
            .field("tag", &self.tag)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl Env {
    /// Opens a new unwind frame.
    pub fn begin_frame(&mut self, tag: &'static str) -> UnwindGuard<'_> {
        self.unwind.frames.push(UnwindFrame {
            tag,
            entries: Vec::new(),
        });
        self.unwind.opened += 1;
        let depth = self.unwind.frames.len();
        UnwindGuard {
            env: self,
            tag,
            depth,
        }
    }
}

impl UnwindGuard<'_> {
    /// Registers a cleanup action in this frame.
    pub fn protect<F>(&mut self, cleanup: F)
    where
        F: FnOnce(&mut Env) + 'static,
    {
        if let Some(frame) = self.env.unwind.frames.get_mut(self.depth - 1) {
            frame.entries.push(Box::new(cleanup));
        }
    }

    /// Closes the frame, running the registered actions in reverse order.
    pub fn run(guard: Self) {
        drop(guard)
    }

    /// Closes the frame without running the registered actions.
    pub fn discard(guard: Self) {
        guard.env.unwind.close(guard.tag, guard.depth);
        std::mem::forget(guard);
    }
}

impl Drop for UnwindGuard<'_> {
    fn drop(&mut self) {
        let entries = self.env.unwind.close(self.tag, self.depth);
        log::trace!("unwinding frame {:?} ({} actions)", self.tag, entries.len());
        for cleanup in entries.into_iter().rev() {
            cleanup(&mut *self.env);
        }
    }
}

impl Deref for UnwindGuard<'_> {
    type Target = Env;
    fn deref(&self) -> &Env {
        self.env
    }
}

impl DerefMut for UnwindGuard<'_> {
    fn deref_mut(&mut self) -> &mut Env {
        self.env
    }
}
