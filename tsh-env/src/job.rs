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

//! Type definitions for job management.
//!
//! The shell does not manage process groups here. The [`JobList`] only
//! remembers which child processes have exited and with what status, which is
//! all the trap engine needs to know about jobs.

use crate::semantics::ExitStatus;
use nix::unistd::Pid;

/// Maximum number of exit records kept in a [`JobList`]
///
/// When more children exit before the records are taken, the oldest records
/// are dropped.
pub const MAX_EXITED: usize = 1024;

/// Record of child processes that have exited
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JobList {
    exited: Vec<(Pid, ExitStatus)>,
    deferred: Vec<(Pid, ExitStatus)>,
    frozen: usize,
}

impl JobList {
    /// Records the exit of a child process.
    ///
    /// While the list is frozen, the record is held back until the list is
    /// thawed.
    pub fn record_exit(&mut self, pid: Pid, exit_status: ExitStatus) {
        if self.is_frozen() {
            self.deferred.push((pid, exit_status));
        } else {
            self.exited.push((pid, exit_status));
            self.trim();
        }
    }

    fn trim(&mut self) {
        let excess = self.exited.len().saturating_sub(MAX_EXITED);
        if excess > 0 {
            log::debug!("dropping {excess} old exit records");
            self.exited.drain(..excess);
        }
    }

    /// Suspends updates to the list.
    ///
    /// Calls nest; the list is updated again after as many calls to
    /// [`thaw`](Self::thaw).
    pub fn freeze(&mut self) {
        self.frozen += 1;
    }

    /// Undoes one [`freeze`](Self::freeze).
    pub fn thaw(&mut self) {
        self.frozen = self.frozen.saturating_sub(1);
        if self.frozen == 0 {
            self.exited.append(&mut self.deferred);
            self.trim();
        }
    }

    /// Whether updates are suspended.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen > 0
    }

    /// Returns the exited children recorded so far, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(Pid, ExitStatus)> {
        self.exited.clone()
    }

    /// Removes and returns the exited children recorded so far, oldest
    /// first.
    ///
    /// Records held back by [`freeze`](Self::freeze) are not included.
    pub fn take_exited(&mut self) -> Vec<(Pid, ExitStatus)> {
        std::mem::take(&mut self.exited)
    }

    /// Forgets everything.
    ///
    /// A subshell does not own the jobs of its parent.
    pub fn reset(&mut self) {
        *self = JobList::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_list_defers_records() {
        let mut jobs = JobList::default();
        let pid = Pid::from_raw(10);
        jobs.freeze();
        jobs.freeze();
        jobs.record_exit(pid, ExitStatus(3));
        assert!(jobs.snapshot().is_empty());

        jobs.thaw();
        assert!(jobs.is_frozen());
        assert!(jobs.snapshot().is_empty());

        jobs.thaw();
        assert!(!jobs.is_frozen());
        assert_eq!(jobs.snapshot(), [(pid, ExitStatus(3))]);
    }

    #[test]
    fn taking_exited_children_empties_list() {
        let mut jobs = JobList::default();
        jobs.record_exit(Pid::from_raw(10), ExitStatus(0));
        jobs.record_exit(Pid::from_raw(11), ExitStatus(1));
        jobs.freeze();
        jobs.record_exit(Pid::from_raw(12), ExitStatus(2));

        assert_eq!(
            jobs.take_exited(),
            [
                (Pid::from_raw(10), ExitStatus(0)),
                (Pid::from_raw(11), ExitStatus(1))
            ]
        );
        assert!(jobs.snapshot().is_empty());

        jobs.thaw();
        assert_eq!(jobs.take_exited(), [(Pid::from_raw(12), ExitStatus(2))]);
        assert!(jobs.take_exited().is_empty());
    }

    #[test]
    fn oldest_records_are_dropped_beyond_limit() {
        let mut jobs = JobList::default();
        for pid in 0..MAX_EXITED + 5 {
            jobs.record_exit(Pid::from_raw(pid as i32 + 100), ExitStatus(0));
        }
        let exited = jobs.snapshot();
        assert_eq!(exited.len(), MAX_EXITED);
        assert_eq!(exited[0].0, Pid::from_raw(105));
    }
}
