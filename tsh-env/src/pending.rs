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

//! Record of caught signals awaiting their traps
//!
//! A [`PendingTrapQueue`] is the only data shared between the signal handler
//! and the rest of the shell. The handler calls [`record`](PendingTrapQueue::record),
//! which touches nothing but atomics and is therefore async-signal-safe. The
//! main flow of control drains the queue at safe points, where running
//! arbitrary shell code is allowed.

use crate::signal::{Number, RawNumber};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Number of per-signal counters
///
/// Signals whose number is not less than this are silently dropped.
pub const SLOT_COUNT: usize = 128;

/// Per-signal counters of caught-but-unhandled signals
#[derive(Debug)]
pub struct PendingTrapQueue {
    counts: [AtomicUsize; SLOT_COUNT],
    work: AtomicBool,
    interrupted: AtomicBool,
    interruptible: AtomicBool,
    immediate: AtomicBool,
}

impl Default for PendingTrapQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingTrapQueue {
    /// Creates an empty queue.
    ///
    /// This is a `const fn` so that the queue can live in a `static`.
    #[must_use]
    pub const fn new() -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const ZERO: AtomicUsize = AtomicUsize::new(0);
        PendingTrapQueue {
            counts: [ZERO; SLOT_COUNT],
            work: AtomicBool::new(false),
            interrupted: AtomicBool::new(false),
            interruptible: AtomicBool::new(false),
            immediate: AtomicBool::new(false),
        }
    }

    /// Records a delivery of the signal.
    ///
    /// This function is called from the signal handler.
    pub fn record(&self, signal: RawNumber) {
        let Some(slot) = usize::try_from(signal)
            .ok()
            .and_then(|index| self.counts.get(index))
        else {
            return;
        };
        slot.fetch_add(1, Ordering::SeqCst);
        if signal == libc::SIGINT {
            self.interrupted.store(true, Ordering::SeqCst);
            if self.interruptible.load(Ordering::SeqCst) {
                self.immediate.store(true, Ordering::SeqCst);
            }
        }
        self.work.store(true, Ordering::SeqCst);
    }

    /// Whether any signal has been recorded since the flag was last taken.
    #[must_use]
    pub fn has_work(&self) -> bool {
        self.work.load(Ordering::SeqCst)
    }

    /// Clears the work flag, returning its previous value.
    pub fn take_work(&self) -> bool {
        self.work.swap(false, Ordering::SeqCst)
    }

    /// Sets the work flag again if any counter is non-zero.
    ///
    /// Call this after leaving some counts unconsumed so that the next safe
    /// point retries them.
    pub fn rearm(&self) {
        if self.counts.iter().any(|c| c.load(Ordering::SeqCst) != 0) {
            self.work.store(true, Ordering::SeqCst);
        }
    }

    /// Returns the number of unhandled deliveries of the signal.
    #[must_use]
    pub fn count(&self, signal: Number) -> usize {
        self.slot(signal)
            .map_or(0, |slot| slot.load(Ordering::SeqCst))
    }

    /// Resets the counter for the signal and returns its previous value.
    pub fn take(&self, signal: Number) -> usize {
        self.slot(signal)
            .map_or(0, |slot| slot.swap(0, Ordering::SeqCst))
    }

    /// Returns the signals that have non-zero counts in ascending order.
    #[must_use]
    pub fn signals(&self) -> Vec<Number> {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| count.load(Ordering::SeqCst) != 0)
            .filter_map(|(index, _)| Number::from_raw(RawNumber::try_from(index).ok()?))
            .collect()
    }

    /// Whether SIGINT has been caught and not yet acknowledged.
    #[must_use]
    pub fn has_interrupt(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Acknowledges a caught SIGINT.
    pub fn clear_interrupt(&self) {
        self.interrupted.store(false, Ordering::SeqCst);
    }

    /// Sets whether a blocking operation is currently waiting.
    ///
    /// While this is true, SIGINT also sets the immediate flag so the waiting
    /// operation can notice the interrupt as soon as the wait is broken.
    /// Returns the previous value.
    pub fn set_interruptible(&self, interruptible: bool) -> bool {
        self.interruptible.swap(interruptible, Ordering::SeqCst)
    }

    /// Clears the immediate-interrupt flag, returning its previous value.
    pub fn take_immediate(&self) -> bool {
        self.immediate.swap(false, Ordering::SeqCst)
    }

    /// Forgets all recorded signals.
    ///
    /// This is used when entering a subshell, which must not run the traps
    /// of its parent.
    pub fn clear(&self) {
        for count in &self.counts {
            count.store(0, Ordering::SeqCst);
        }
        self.work.store(false, Ordering::SeqCst);
        self.interrupted.store(false, Ordering::SeqCst);
        self.immediate.store(false, Ordering::SeqCst);
    }

    fn slot(&self, signal: Number) -> Option<&AtomicUsize> {
        usize::try_from(signal.as_raw())
            .ok()
            .and_then(|index| self.counts.get(index))
    }
}
