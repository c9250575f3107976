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

//! Bound on nested trap execution

use super::Condition;

/// Default maximum number of nested trap runs
pub const DEFAULT_CEILING: usize = 100;

/// Depth counter for nested trap runs
///
/// A signal can arrive while a trap is running, and its trap runs at the next
/// safe point inside the running one. The guard counts such nesting and
/// refuses to dispatch more traps once the ceiling is reached. Refused
/// signals stay pending.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecursionGuard {
    depth: usize,
    ceiling: Option<usize>,
    running: Option<Condition>,
}

impl Default for RecursionGuard {
    fn default() -> Self {
        RecursionGuard::new(Some(DEFAULT_CEILING))
    }
}

impl RecursionGuard {
    /// Creates a guard with the given ceiling.
    ///
    /// `None` means unlimited.
    #[must_use]
    pub fn new(ceiling: Option<usize>) -> Self {
        RecursionGuard {
            depth: 0,
            ceiling,
            running: None,
        }
    }

    /// Returns the number of trap runs in progress.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the ceiling.
    #[must_use]
    pub fn ceiling(&self) -> Option<usize> {
        self.ceiling
    }

    /// Changes the ceiling.
    pub fn set_ceiling(&mut self, ceiling: Option<usize>) {
        self.ceiling = ceiling;
    }

    /// Returns the condition of the innermost running trap.
    #[must_use]
    pub fn running(&self) -> Option<Condition> {
        self.running
    }

    /// Whether another trap may start now.
    #[must_use]
    pub fn can_enter(&self) -> bool {
        self.ceiling.is_none_or(|ceiling| self.depth < ceiling)
    }

    /// Records the start of a trap run.
    ///
    /// Returns the previously running condition, which must be passed to
    /// [`leave`](Self::leave).
    pub fn enter(&mut self, cond: Condition) -> Option<Condition> {
        self.depth += 1;
        self.running.replace(cond)
    }

    /// Records the end of a trap run.
    pub fn leave(&mut self, previous: Option<Condition>) {
        self.depth = self.depth.saturating_sub(1);
        self.running = previous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Number;

    #[test]
    fn ceiling_is_enforced() {
        let mut guard = RecursionGuard::new(Some(2));
        assert!(guard.can_enter());
        let first = guard.enter(Condition::Exit);
        assert_eq!(first, None);
        let second = guard.enter(Number::SIGINT.into());
        assert_eq!(second, Some(Condition::Exit));
        assert_eq!(guard.depth(), 2);
        assert!(!guard.can_enter());

        guard.leave(second);
        assert_eq!(guard.running(), Some(Condition::Exit));
        assert!(guard.can_enter());
        guard.leave(first);
        assert_eq!(guard.running(), None);
        assert_eq!(guard.depth(), 0);
    }

    #[test]
    fn unlimited_guard() {
        let mut guard = RecursionGuard::new(None);
        for _ in 0..1000 {
            guard.enter(Condition::Debug);
        }
        assert!(guard.can_enter());
    }
}
