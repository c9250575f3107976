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

//! Implementation of `System` that actually interacts with the system

use super::{
    ChildWait, Disposition, Errno, Fd, Io, Pid, SendSignal, Sigaction, SigmaskOp, Sigmask, System,
};
use crate::pending::PendingTrapQueue;
use crate::semantics::ExitStatus;
use crate::signal::{Name, Number};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_int;
use std::mem::MaybeUninit;

static PENDING: PendingTrapQueue = PendingTrapQueue::new();

/// Signal catching function.
extern "C" fn catch_signal(signal: c_int) {
    // Only async-signal-safe operations are allowed here.
    PENDING.record(signal);
}

fn to_sigaction(disposition: Disposition) -> libc::sigaction {
    let handler = match disposition {
        Disposition::Default => libc::SIG_DFL,
        Disposition::Ignore => libc::SIG_IGN,
        Disposition::Catch => catch_signal as extern "C" fn(c_int) as libc::sighandler_t,
    };
    // SAFETY: all-zero is a valid bit pattern for `sigaction`.
    let mut action: libc::sigaction = unsafe { std::mem::zeroed() };
    action.sa_sigaction = handler;
    // No SA_RESTART: a blocking read must return EINTR when a trap is due.
    action.sa_flags = 0;
    unsafe { libc::sigemptyset(&mut action.sa_mask) };
    action
}

fn from_sigaction(action: &libc::sigaction) -> Disposition {
    match action.sa_sigaction {
        libc::SIG_DFL => Disposition::Default,
        libc::SIG_IGN => Disposition::Ignore,
        _ => Disposition::Catch,
    }
}

fn to_sigset(signals: &[Number]) -> libc::sigset_t {
    let mut set = MaybeUninit::<libc::sigset_t>::uninit();
    unsafe {
        libc::sigemptyset(set.as_mut_ptr());
        for signal in signals {
            libc::sigaddset(set.as_mut_ptr(), signal.as_raw());
        }
        set.assume_init()
    }
}

fn from_sigset(set: &libc::sigset_t) -> Vec<Number> {
    Name::iter()
        .map(Name::number)
        .filter(|number| unsafe { libc::sigismember(set, number.as_raw()) == 1 })
        .collect()
}

/// Implementation of `System` that actually interacts with the system.
///
/// The underlying operating system manages most of the system's state.
/// `RealSystem` only keeps the bytes of lines that a signal interrupted
/// before the newline arrived, so that the next [`read_line`](Io::read_line)
/// on the same file descriptor continues the line instead of losing them.
#[derive(Debug)]
pub struct RealSystem {
    partial_lines: RefCell<HashMap<Fd, Vec<u8>>>,
}

impl RealSystem {
    /// Returns an instance of `RealSystem`.
    ///
    /// # Safety
    ///
    /// The signal handler installed by `RealSystem` writes to a process-wide
    /// queue. You must not create more than one `RealSystem` or use it from
    /// more than one thread.
    pub unsafe fn new() -> Self {
        RealSystem {
            partial_lines: RefCell::default(),
        }
    }
}

impl Sigaction for RealSystem {
    fn get_sigaction(&self, signal: Number) -> Result<Disposition, Errno> {
        let mut old = MaybeUninit::<libc::sigaction>::uninit();
        let result =
            unsafe { libc::sigaction(signal.as_raw(), std::ptr::null(), old.as_mut_ptr()) };
        Errno::result(result)?;
        let old = unsafe { old.assume_init() };
        Ok(from_sigaction(&old))
    }

    fn sigaction(&self, signal: Number, disposition: Disposition) -> Result<Disposition, Errno> {
        let new = to_sigaction(disposition);
        let mut old = MaybeUninit::<libc::sigaction>::uninit();
        // SAFETY: `catch_signal` only accesses atomic variables.
        let result = unsafe { libc::sigaction(signal.as_raw(), &new, old.as_mut_ptr()) };
        Errno::result(result)?;
        let old = unsafe { old.assume_init() };
        Ok(from_sigaction(&old))
    }
}

impl Sigmask for RealSystem {
    fn sigmask(&self, op: SigmaskOp, signals: &[Number]) -> Result<Vec<Number>, Errno> {
        let how = match op {
            SigmaskOp::Add => libc::SIG_BLOCK,
            SigmaskOp::Remove => libc::SIG_UNBLOCK,
            SigmaskOp::Set => libc::SIG_SETMASK,
        };
        let set = to_sigset(signals);
        let mut old = MaybeUninit::<libc::sigset_t>::uninit();
        let result = unsafe { libc::sigprocmask(how, &set, old.as_mut_ptr()) };
        Errno::result(result)?;
        let old = unsafe { old.assume_init() };
        Ok(from_sigset(&old))
    }
}

impl SendSignal for RealSystem {
    fn getpid(&self) -> Pid {
        nix::unistd::getpid()
    }

    fn kill(&self, target: Pid, signal: Number) -> Result<(), Errno> {
        let result = unsafe { libc::kill(target.as_raw(), signal.as_raw()) };
        Errno::result(result).map(drop)
    }
}

impl ChildWait for RealSystem {
    fn wait_any(&self) -> Result<Option<(Pid, ExitStatus)>, Errno> {
        loop {
            match waitpid(None, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::Exited(pid, status)) => return Ok(Some((pid, ExitStatus(status)))),
                Ok(WaitStatus::Signaled(pid, signal, _)) => {
                    let status = Number::from_raw(signal as c_int)
                        .map_or(ExitStatus::FAILURE, ExitStatus::from);
                    return Ok(Some((pid, status)));
                }
                Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => return Ok(None),
                Ok(_) => continue,
                Err(Errno::EINTR) => continue,
                Err(errno) => return Err(errno),
            }
        }
    }
}

impl Io for RealSystem {
    fn write(&self, fd: Fd, bytes: &[u8]) -> Result<usize, Errno> {
        let result = unsafe { libc::write(fd.0, bytes.as_ptr().cast(), bytes.len()) };
        Errno::result(result).map(|count| count as usize)
    }

    fn read_line(&self, fd: Fd) -> Result<Option<String>, Errno> {
        let mut line = self.partial_lines.borrow_mut().remove(&fd).unwrap_or_default();
        loop {
            let mut byte = 0_u8;
            let result = unsafe { libc::read(fd.0, (&raw mut byte).cast(), 1) };
            match Errno::result(result) {
                Ok(0) if line.is_empty() => return Ok(None),
                Ok(0) => break,
                Ok(_) if byte == b'\n' => break,
                Ok(_) => line.push(byte),
                Err(errno) => {
                    if !line.is_empty() {
                        self.partial_lines.borrow_mut().insert(fd, line);
                    }
                    return Err(errno);
                }
            }
        }
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }

    fn read_file(&self, path: &str) -> Result<String, Errno> {
        std::fs::read_to_string(path).map_err(|e| {
            let raw = e.raw_os_error().unwrap_or(libc::EIO);
            Errno::from_raw(raw)
        })
    }
}

impl System for RealSystem {
    fn pending(&self) -> &PendingTrapQueue {
        &PENDING
    }
}
