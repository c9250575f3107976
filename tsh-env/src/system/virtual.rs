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

//! System simulated in Rust
//!
//! [`VirtualSystem`] is a [`System`] implementation that keeps every piece of
//! state in memory. It is used in tests to drive the trap engine with
//! deterministic signal deliveries.
//!
//! A signal reaches the shell through [`VirtualSystem::raise_signal`]. If the
//! signal is blocked, it stays pending until unblocked. Otherwise its current
//! disposition decides the effect: a caught signal is recorded in the
//! [`PendingTrapQueue`], an ignored signal vanishes, and a signal with the
//! default disposition may terminate the simulated process, which is
//! reported by [`SystemState::terminated_by`].
//!
//! Signals scheduled in [`SystemState::signals_on_read`] are delivered when
//! [`read_line`](Io::read_line) would otherwise block on empty input. This
//! simulates a signal arriving while the shell waits for input. Entries of
//! [`SystemState::interrupted_lines`] simulate a signal arriving in the middle
//! of a line: the text before the signal is kept and prepended to the line
//! returned by the next read.

use super::{
    ChildWait, Disposition, Errno, Fd, Io, Pid, SendSignal, Sigaction, SigmaskOp, Sigmask, System,
};
use crate::pending::PendingTrapQueue;
use crate::semantics::ExitStatus;
use crate::signal::Number;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

/// Process ID of the simulated shell
pub const PID: Pid = Pid::from_raw(2);

/// State of the simulated system
#[derive(Debug, Default)]
pub struct SystemState {
    /// Current signal dispositions; absent signals have the default one
    pub dispositions: HashMap<Number, Disposition>,
    /// Signal mask
    pub blocked: BTreeSet<Number>,
    /// Signals delivered while blocked
    pub blocked_pending: BTreeSet<Number>,
    /// Signal whose default action terminated the process
    pub terminated_by: Option<Number>,
    /// Signals sent with [`SendSignal::kill`] to other processes
    pub sent: Vec<(Pid, Number)>,
    /// Child processes that have terminated but not been reaped
    pub exited_children: VecDeque<(Pid, ExitStatus)>,
    /// Lines available on the standard input
    pub stdin: VecDeque<String>,
    /// Signals delivered when reading from empty standard input
    pub signals_on_read: VecDeque<Number>,
    /// Partial lines each followed by a signal, read before `stdin`
    pub interrupted_lines: VecDeque<(String, Number)>,
    /// Text of the standard input read before the end of the current line
    pub partial_line: String,
    /// Content written to the standard output
    pub stdout: String,
    /// Content written to the standard error
    pub stderr: String,
    /// Files readable with [`Io::read_file`]
    pub files: HashMap<String, String>,
    /// Number of calls to [`Sigaction::sigaction`]
    pub sigaction_calls: usize,
}

/// Simulated system
///
/// Clones of a `VirtualSystem` share the same state.
#[derive(Clone, Debug, Default)]
pub struct VirtualSystem {
    /// State of the system
    pub state: Rc<RefCell<SystemState>>,
    pending: Rc<PendingTrapQueue>,
}

impl VirtualSystem {
    /// Creates a new virtual system.
    #[must_use]
    pub fn new() -> VirtualSystem {
        VirtualSystem::default()
    }

    /// Delivers a signal to the simulated shell process.
    pub fn raise_signal(&self, signal: Number) {
        let mut state = self.state.borrow_mut();
        if state.blocked.contains(&signal) {
            state.blocked_pending.insert(signal);
            return;
        }
        let disposition = state.dispositions.get(&signal).copied().unwrap_or_default();
        drop(state);
        self.deliver(signal, disposition);
    }

    fn deliver(&self, signal: Number, disposition: Disposition) {
        match disposition {
            Disposition::Catch => self.pending.record(signal.as_raw()),
            Disposition::Ignore => (),
            Disposition::Default => {
                if signal.name().is_some_and(|name| name.terminates_by_default()) {
                    let mut state = self.state.borrow_mut();
                    state.terminated_by.get_or_insert(signal);
                }
            }
        }
    }

    /// Returns the current disposition of the signal.
    #[must_use]
    pub fn disposition(&self, signal: Number) -> Disposition {
        let state = self.state.borrow();
        state.dispositions.get(&signal).copied().unwrap_or_default()
    }
}

impl Sigaction for VirtualSystem {
    fn get_sigaction(&self, signal: Number) -> Result<Disposition, Errno> {
        Ok(self.disposition(signal))
    }

    fn sigaction(&self, signal: Number, disposition: Disposition) -> Result<Disposition, Errno> {
        if signal == Number::SIGKILL || signal == Number::SIGSTOP {
            return Err(Errno::EINVAL);
        }
        let mut state = self.state.borrow_mut();
        state.sigaction_calls += 1;
        let old = state.dispositions.insert(signal, disposition);
        Ok(old.unwrap_or_default())
    }
}

impl Sigmask for VirtualSystem {
    fn sigmask(&self, op: SigmaskOp, signals: &[Number]) -> Result<Vec<Number>, Errno> {
        let mut state = self.state.borrow_mut();
        let old = state.blocked.iter().copied().collect();
        match op {
            SigmaskOp::Add => state.blocked.extend(signals),
            SigmaskOp::Remove => {
                for signal in signals {
                    state.blocked.remove(signal);
                }
            }
            SigmaskOp::Set => state.blocked = signals.iter().copied().collect(),
        }

        let unblocked = state
            .blocked_pending
            .iter()
            .copied()
            .filter(|signal| !state.blocked.contains(signal))
            .collect::<Vec<_>>();
        for signal in &unblocked {
            state.blocked_pending.remove(signal);
        }
        drop(state);

        for signal in unblocked {
            self.deliver(signal, self.disposition(signal));
        }
        Ok(old)
    }
}

impl SendSignal for VirtualSystem {
    fn getpid(&self) -> Pid {
        PID
    }

    fn kill(&self, target: Pid, signal: Number) -> Result<(), Errno> {
        if target == PID {
            self.raise_signal(signal);
        } else {
            self.state.borrow_mut().sent.push((target, signal));
        }
        Ok(())
    }
}

impl ChildWait for VirtualSystem {
    fn wait_any(&self) -> Result<Option<(Pid, ExitStatus)>, Errno> {
        Ok(self.state.borrow_mut().exited_children.pop_front())
    }
}

impl Io for VirtualSystem {
    fn write(&self, fd: Fd, bytes: &[u8]) -> Result<usize, Errno> {
        let text = String::from_utf8_lossy(bytes);
        let mut state = self.state.borrow_mut();
        match fd {
            Fd::STDOUT => state.stdout.push_str(&text),
            Fd::STDERR => state.stderr.push_str(&text),
            _ => return Err(Errno::EBADF),
        }
        Ok(bytes.len())
    }

    fn read_line(&self, fd: Fd) -> Result<Option<String>, Errno> {
        if fd != Fd::STDIN {
            return Err(Errno::EBADF);
        }
        let mut state = self.state.borrow_mut();
        let signal = if let Some((text, signal)) = state.interrupted_lines.pop_front() {
            state.partial_line.push_str(&text);
            signal
        } else if let Some(line) = state.stdin.pop_front() {
            let mut head = std::mem::take(&mut state.partial_line);
            head.push_str(&line);
            return Ok(Some(head));
        } else if let Some(signal) = state.signals_on_read.pop_front() {
            signal
        } else if state.partial_line.is_empty() {
            return Ok(None);
        } else {
            return Ok(Some(std::mem::take(&mut state.partial_line)));
        };
        drop(state);
        self.raise_signal(signal);
        Err(Errno::EINTR)
    }

    fn read_file(&self, path: &str) -> Result<String, Errno> {
        let state = self.state.borrow();
        state.files.get(path).cloned().ok_or(Errno::ENOENT)
    }
}

impl System for VirtualSystem {
    fn pending(&self) -> &PendingTrapQueue {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caught_signal_is_recorded() {
        let system = VirtualSystem::new();
        system.sigaction(Number::SIGUSR1, Disposition::Catch).unwrap();
        system.raise_signal(Number::SIGUSR1);
        assert_eq!(system.pending().count(Number::SIGUSR1), 1);
        assert_eq!(system.state.borrow().terminated_by, None);
    }

    #[test]
    fn ignored_signal_vanishes() {
        let system = VirtualSystem::new();
        system.sigaction(Number::SIGUSR1, Disposition::Ignore).unwrap();
        system.raise_signal(Number::SIGUSR1);
        assert_eq!(system.pending().count(Number::SIGUSR1), 0);
        assert_eq!(system.state.borrow().terminated_by, None);
    }

    #[test]
    fn default_disposition_terminates() {
        let system = VirtualSystem::new();
        system.raise_signal(Number::SIGCHLD);
        assert_eq!(system.state.borrow().terminated_by, None);
        system.raise_signal(Number::SIGTERM);
        assert_eq!(system.state.borrow().terminated_by, Some(Number::SIGTERM));
    }

    #[test]
    fn blocked_signal_is_delivered_on_unblock() {
        let system = VirtualSystem::new();
        system.sigaction(Number::SIGINT, Disposition::Catch).unwrap();
        system.sigmask(SigmaskOp::Add, &[Number::SIGINT]).unwrap();
        system.raise_signal(Number::SIGINT);
        assert_eq!(system.pending().count(Number::SIGINT), 0);

        let old = system.sigmask(SigmaskOp::Remove, &[Number::SIGINT]).unwrap();
        assert_eq!(old, [Number::SIGINT]);
        assert_eq!(system.pending().count(Number::SIGINT), 1);
    }

    #[test]
    fn sigaction_returns_previous_disposition() {
        let system = VirtualSystem::new();
        let old = system.sigaction(Number::SIGHUP, Disposition::Ignore).unwrap();
        assert_eq!(old, Disposition::Default);
        let old = system.sigaction(Number::SIGHUP, Disposition::Catch).unwrap();
        assert_eq!(old, Disposition::Ignore);
        assert_eq!(system.get_sigaction(Number::SIGHUP), Ok(Disposition::Catch));
        assert_eq!(
            system.sigaction(Number::SIGKILL, Disposition::Catch),
            Err(Errno::EINVAL)
        );
    }

    #[test]
    fn read_line_delivers_scheduled_signal_on_empty_input() {
        let system = VirtualSystem::new();
        system.sigaction(Number::SIGINT, Disposition::Catch).unwrap();
        {
            let mut state = system.state.borrow_mut();
            state.stdin.push_back("first".to_string());
            state.signals_on_read.push_back(Number::SIGINT);
        }
        assert_eq!(system.read_line(Fd::STDIN), Ok(Some("first".to_string())));
        assert_eq!(system.read_line(Fd::STDIN), Err(Errno::EINTR));
        assert_eq!(system.pending().count(Number::SIGINT), 1);
        assert_eq!(system.read_line(Fd::STDIN), Ok(None));
    }

    #[test]
    fn read_line_resumes_line_interrupted_by_signal() {
        let system = VirtualSystem::new();
        system.sigaction(Number::SIGCHLD, Disposition::Catch).unwrap();
        {
            let mut state = system.state.borrow_mut();
            state
                .interrupted_lines
                .push_back(("foo".to_string(), Number::SIGCHLD));
            state.stdin.push_back("bar".to_string());
        }
        assert_eq!(system.read_line(Fd::STDIN), Err(Errno::EINTR));
        assert_eq!(system.pending().count(Number::SIGCHLD), 1);
        assert_eq!(system.read_line(Fd::STDIN), Ok(Some("foobar".to_string())));
        assert_eq!(system.read_line(Fd::STDIN), Ok(None));
    }

    #[test]
    fn unterminated_partial_line_is_returned_at_end_of_input() {
        let system = VirtualSystem::new();
        system
            .state
            .borrow_mut()
            .interrupted_lines
            .push_back(("tail".to_string(), Number::SIGCHLD));
        assert_eq!(system.read_line(Fd::STDIN), Err(Errno::EINTR));
        assert_eq!(system.read_line(Fd::STDIN), Ok(Some("tail".to_string())));
        assert_eq!(system.read_line(Fd::STDIN), Ok(None));
    }

    #[test]
    fn kill_to_self_raises() {
        let system = VirtualSystem::new();
        system.sigaction(Number::SIGUSR2, Disposition::Catch).unwrap();
        system.raise(Number::SIGUSR2).unwrap();
        assert_eq!(system.pending().count(Number::SIGUSR2), 1);

        let other = Pid::from_raw(10);
        system.kill(other, Number::SIGTERM).unwrap();
        assert_eq!(system.state.borrow().sent, [(other, Number::SIGTERM)]);
    }
}
