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

//! Runtime execution context stack
//!
//! The ["stack"](Stack) traces the state of execution context at runtime.
//! For example, when running a trap, the runner pushes `Frame::Trap` to the
//! stack. By examining the stack, commands executed in the trap can detect
//! that they are inside the trap.
//!
//! [`Env::push_frame`] returns an [`EnvFrameGuard`] that pops the frame when
//! dropped and implements `DerefMut<Target = Env>`.

use crate::Env;
use crate::semantics::ExitStatus;
use crate::trap::Condition;
use std::ops::Deref;
use std::ops::DerefMut;

/// Element of runtime execution context stack
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Frame {
    /// Function call
    Function {
        /// Name of the function
        name: String,
    },

    /// Script executed by the `.` built-in
    DotScript,

    /// Command string executed by the `eval` built-in
    Eval {
        /// Whether a `return` in the string returns from an enclosing
        /// function or dot script
        returnable: bool,
    },

    /// Trap
    Trap {
        /// Condition that triggered the trap
        condition: Condition,
        /// Exit status saved just before entering the trap
        previous_exit_status: ExitStatus,
    },

    /// Subshell
    Subshell,
}

/// Runtime execution context stack
///
/// You can access the inner vector of the stack via the `Deref` implementation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stack {
    inner: Vec<Frame>,
}

impl Deref for Stack {
    type Target = Vec<Frame>;
    fn deref(&self) -> &Vec<Frame> {
        &self.inner
    }
}

impl Stack {
    /// Frames pushed after the last `Frame::Subshell`
    fn current_environment(&self) -> impl Iterator<Item = &Frame> {
        self.inner
            .iter()
            .rev()
            .take_while(|frame| **frame != Frame::Subshell)
    }

    /// Whether a function is being executed in the current environment.
    #[must_use]
    pub fn in_function(&self) -> bool {
        self.current_environment()
            .any(|frame| matches!(frame, Frame::Function { .. }))
    }

    /// Whether the `return` built-in has a function or dot script to return
    /// from.
    #[must_use]
    pub fn can_return(&self) -> bool {
        self.current_environment()
            .any(|frame| matches!(frame, Frame::Function { .. } | Frame::DotScript))
    }

    /// Whether a trap for the condition is being executed.
    #[must_use]
    pub fn in_trap(&self, cond: Condition) -> bool {
        self.inner
            .iter()
            .any(|frame| matches!(frame, Frame::Trap { condition, .. } if *condition == cond))
    }

    /// Returns the innermost trap frame, if any.
    ///
    /// The result is `Some((condition, previous_exit_status))`.
    #[must_use]
    pub fn current_trap(&self) -> Option<(Condition, ExitStatus)> {
        self.inner.iter().rev().find_map(|frame| match frame {
            Frame::Trap {
                condition,
                previous_exit_status,
            } => Some((*condition, *previous_exit_status)),
            _ => None,
        })
    }

    /// Whether the shell is running in a subshell.
    #[must_use]
    pub fn in_subshell(&self) -> bool {
        self.inner.contains(&Frame::Subshell)
    }
}

/// RAII-style guard that makes sure a stack frame is popped properly
///
/// The guard object is created by [`Env::push_frame`].
#[derive(Debug)]
#[must_use = "The frame is popped when the guard is dropped"]
pub struct EnvFrameGuard<'a> {
    env: &'a mut Env,
}

impl Env {
    /// Pushes a new frame to the runtime execution context stack.
    ///
    /// This function returns an `EnvFrameGuard` that allows re-borrowing the
    /// `Env`.
    #[inline]
    pub fn push_frame(&mut self, frame: Frame) -> EnvFrameGuard<'_> {
        self.stack.inner.push(frame);
        EnvFrameGuard { env: self }
    }

    /// Pops the topmost frame from the runtime execution context stack.
    #[inline]
    pub fn pop_frame(guard: EnvFrameGuard<'_>) -> Option<Frame> {
        let frame = guard.env.stack.inner.pop();
        std::mem::forget(guard);
        frame
    }

    /// Pushes a frame that is never popped.
    ///
    /// This is used when entering a subshell, which lasts until the process
    /// exits.
    pub fn push_permanent_frame(&mut self, frame: Frame) {
        self.stack.inner.push(frame);
    }
}

/// When the guard is dropped, the stack frame that was pushed when creating the
/// guard is popped.
impl Drop for EnvFrameGuard<'_> {
    fn drop(&mut self) {
        self.env.stack.inner.pop();
    }
}

impl Deref for EnvFrameGuard<'_> {
    type Target = Env;
    fn deref(&self) -> &Env {
        self.env
    }
}

impl DerefMut for EnvFrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut Env {
        self.env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Number;

    #[test]
    fn function_and_dot_script_frames() {
        let mut env = Env::new_virtual();
        assert!(!env.stack.in_function());
        assert!(!env.stack.can_return());

        let mut env = env.push_frame(Frame::DotScript);
        assert!(!env.stack.in_function());
        assert!(env.stack.can_return());

        let env = env.push_frame(Frame::Function {
            name: "f".to_string(),
        });
        assert!(env.stack.in_function());
        assert!(env.stack.can_return());
    }

    #[test]
    fn subshell_hides_outer_function() {
        let mut env = Env::new_virtual();
        let mut env = env.push_frame(Frame::Function {
            name: "f".to_string(),
        });
        let env = env.push_frame(Frame::Subshell);
        assert!(!env.stack.in_function());
        assert!(!env.stack.can_return());
        assert!(env.stack.in_subshell());
    }

    #[test]
    fn trap_frames() {
        let mut env = Env::new_virtual();
        assert_eq!(env.stack.current_trap(), None);

        let cond = Condition::from(Number::SIGINT);
        let mut env = env.push_frame(Frame::Trap {
            condition: cond,
            previous_exit_status: ExitStatus(3),
        });
        let env = env.push_frame(Frame::Trap {
            condition: Condition::Debug,
            previous_exit_status: ExitStatus(0),
        });
        assert!(env.stack.in_trap(cond));
        assert!(env.stack.in_trap(Condition::Debug));
        assert!(!env.stack.in_trap(Condition::Err));
        assert_eq!(
            env.stack.current_trap(),
            Some((Condition::Debug, ExitStatus(0)))
        );
    }

    #[test]
    fn guard_pops_on_drop() {
        let mut env = Env::new_virtual();
        {
            let env = env.push_frame(Frame::DotScript);
            assert_eq!(env.stack.len(), 1);
        }
        assert_eq!(env.stack.len(), 0);

        let guard = env.push_frame(Frame::Subshell);
        assert_eq!(Env::pop_frame(guard), Some(Frame::Subshell));
        assert_eq!(env.stack.len(), 0);
    }
}
