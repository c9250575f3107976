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

//! API declarations and implementations for system-managed parts of the environment
//!
//! The [`System`] trait is the seam between the shell and the operating
//! system. It is split into several smaller traits by concern. There are two
//! implementors:
//!
//! - [`RealSystem`](real::RealSystem) performs actual system calls.
//! - [`VirtualSystem`](r#virtual::VirtualSystem) simulates the system in
//!   memory for testing.

pub mod real;
pub mod r#virtual;

use crate::pending::PendingTrapQueue;
use crate::semantics::ExitStatus;
use crate::signal::Number;
#[doc(no_inline)]
pub use nix::errno::Errno;
#[doc(no_inline)]
pub use nix::unistd::Pid;
use std::ffi::c_int;
use std::fmt::Debug;
use std::rc::Rc;

/// How a signal is handled by the process
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Disposition {
    /// Perform the default action for the signal.
    #[default]
    Default,
    /// Ignore the signal.
    Ignore,
    /// Catch the signal and record it in the [`PendingTrapQueue`].
    Catch,
}

/// Operation applied to the signal mask
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SigmaskOp {
    /// Add signals to the mask (block them).
    Add,
    /// Remove signals from the mask (unblock them).
    Remove,
    /// Replace the mask.
    Set,
}

/// File descriptor
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fd(pub c_int);

impl Fd {
    /// File descriptor for the standard input
    pub const STDIN: Fd = Fd(0);
    /// File descriptor for the standard output
    pub const STDOUT: Fd = Fd(1);
    /// File descriptor for the standard error
    pub const STDERR: Fd = Fd(2);
}

/// Signal disposition management
pub trait Sigaction {
    /// Returns the current disposition of the signal without changing it.
    fn get_sigaction(&self, signal: Number) -> Result<Disposition, Errno>;

    /// Changes the disposition of the signal, returning the previous one.
    fn sigaction(&self, signal: Number, disposition: Disposition) -> Result<Disposition, Errno>;
}

/// Signal mask management
pub trait Sigmask {
    /// Modifies the signal mask and returns the signals that were blocked
    /// before the modification.
    fn sigmask(&self, op: SigmaskOp, signals: &[Number]) -> Result<Vec<Number>, Errno>;
}

/// Sending signals
pub trait SendSignal {
    /// Returns the process ID of the shell.
    fn getpid(&self) -> Pid;

    /// Sends the signal to the process.
    fn kill(&self, target: Pid, signal: Number) -> Result<(), Errno>;

    /// Sends the signal to the shell itself.
    fn raise(&self, signal: Number) -> Result<(), Errno> {
        self.kill(self.getpid(), signal)
    }
}

/// Reaping child processes
pub trait ChildWait {
    /// Reaps one terminated child process without blocking.
    ///
    /// Returns `Ok(None)` if no child has terminated.
    fn wait_any(&self) -> Result<Option<(Pid, ExitStatus)>, Errno>;
}

/// Input and output
pub trait Io {
    /// Writes bytes to the file descriptor.
    fn write(&self, fd: Fd, bytes: &[u8]) -> Result<usize, Errno>;

    /// Writes all the bytes to the file descriptor.
    ///
    /// Interrupted writes are retried.
    fn write_all(&self, fd: Fd, mut bytes: &[u8]) -> Result<(), Errno> {
        while !bytes.is_empty() {
            match self.write(fd, bytes) {
                Ok(0) => return Err(Errno::EIO),
                Ok(count) => bytes = &bytes[count..],
                Err(Errno::EINTR) => (),
                Err(errno) => return Err(errno),
            }
        }
        Ok(())
    }

    /// Reads a line from the file descriptor, blocking until it is available.
    ///
    /// The returned line does not include the terminating newline. Returns
    /// `Ok(None)` at the end of input. Returns `Err(Errno::EINTR)` if a caught
    /// signal interrupted the wait.
    fn read_line(&self, fd: Fd) -> Result<Option<String>, Errno>;

    /// Reads the whole content of a file.
    fn read_file(&self, path: &str) -> Result<String, Errno>;
}

/// API to the system-managed parts of the environment
pub trait System: Sigaction + Sigmask + SendSignal + ChildWait + Io + Debug {
    /// Returns the queue that the signal handler records caught signals in.
    fn pending(&self) -> &PendingTrapQueue;
}

/// System shared by the environment and the objects that read input
pub type SharedSystem = Rc<dyn System>;

/// Guard that keeps a signal blocked while it is alive
///
/// Dropping the guard unblocks the signal unless it was already blocked when
/// the guard was created. Disposition changes are made under this guard so
/// that a delivery cannot observe a half-updated trap slot.
#[derive(Debug)]
#[must_use = "the signal is unblocked when the guard is dropped"]
pub struct SignalBlock<'a> {
    system: &'a dyn System,
    signal: Number,
    was_blocked: bool,
}

impl<'a> SignalBlock<'a> {
    /// Blocks the signal.
    pub fn new(system: &'a dyn System, signal: Number) -> Result<Self, Errno> {
        let old_mask = system.sigmask(SigmaskOp::Add, &[signal])?;
        let was_blocked = old_mask.contains(&signal);
        Ok(SignalBlock {
            system,
            signal,
            was_blocked,
        })
    }
}

impl Drop for SignalBlock<'_> {
    fn drop(&mut self) {
        if !self.was_blocked {
            if let Err(errno) = self.system.sigmask(SigmaskOp::Remove, &[self.signal]) {
                log::warn!("cannot unblock signal {}: {errno}", self.signal);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::r#virtual::VirtualSystem;
    use super::*;

    #[test]
    fn signal_block_restores_mask() {
        let system = VirtualSystem::new();
        {
            let _block = SignalBlock::new(&system, Number::SIGINT).unwrap();
            assert!(system.state.borrow().blocked.contains(&Number::SIGINT));
        }
        assert!(!system.state.borrow().blocked.contains(&Number::SIGINT));
    }

    #[test]
    fn signal_block_keeps_previously_blocked_signal() {
        let system = VirtualSystem::new();
        system.sigmask(SigmaskOp::Add, &[Number::SIGINT]).unwrap();
        drop(SignalBlock::new(&system, Number::SIGINT).unwrap());
        assert!(system.state.borrow().blocked.contains(&Number::SIGINT));
    }

    #[test]
    fn write_all_writes_everything() {
        let system = VirtualSystem::new();
        system.write_all(Fd::STDOUT, b"hello\n").unwrap();
        assert_eq!(system.state.borrow().stdout, "hello\n");
    }
}
