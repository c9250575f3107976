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

//! Items that manage the state of a single trap condition.

#[cfg(doc)]
use super::TrapSet;
use crate::system::{Disposition, Errno};
use bitflags::bitflags;
use std::rc::Rc;
use thiserror::Error;
use tsh_syntax::source::Location;

/// Action performed when a [`Condition`](super::Condition) is met
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Action {
    /// Performs the default action.
    ///
    /// For signal conditions, the behavior depends on the signal delivered.
    /// For other conditions, this is equivalent to `Ignore`.
    #[default]
    Default,

    /// Pretends as if the condition was not met.
    Ignore,

    /// Executes a command string.
    Command(Rc<str>),
}

bitflags! {
    /// Mode flags of a trap slot
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct SignalMode: u16 {
        /// The action was kept from the parent shell when entering a subshell.
        const INHERITED = 1 << 0;
        /// A command is set for the condition.
        const TRAPPED = 1 << 1;
        /// The shell installs its own handler for the signal when no command
        /// is set.
        const SPECIAL = 1 << 2;
        /// The user set the condition to be ignored.
        const IGNORED = 1 << 3;
        /// The signal was ignored on entry to a non-interactive shell, so the
        /// user may not change it.
        const HARD_IGNORE = 1 << 4;
        /// The shell always catches the signal itself; setting a trap changes
        /// only the recorded action.
        const NO_TRAP = 1 << 5;
        /// The trap command is currently running.
        const INPROGRESS = 1 << 6;
        /// The action was replaced while the trap command was running.
        const CHANGED = 1 << 7;
    }
}

/// Error that may happen in setting a trap.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum SetActionError {
    /// Attempt to set a trap that has been ignored since the shell startup.
    #[error("the signal has been ignored since startup")]
    InitiallyIgnored,
    /// Attempt to set a trap for the `SIGKILL` signal.
    #[error("cannot set a trap for SIGKILL")]
    SIGKILL,
    /// Attempt to set a trap for the `SIGSTOP` signal.
    #[error("cannot set a trap for SIGSTOP")]
    SIGSTOP,
    /// Error from the underlying system interface.
    #[error(transparent)]
    SystemError(#[from] Errno),
}

/// Whole configuration and state for a trap condition.
#[derive(Clone, Debug, Default)]
pub struct SlotState {
    /// Action taken when the condition is met.
    pub action: Action,
    /// Mode flags
    pub mode: SignalMode,
    /// Location of the simple command that invoked the trap built-in that set
    /// the current action.
    pub origin: Option<Location>,
    /// Disposition the signal had when the shell first touched it
    pub original: Option<Disposition>,
    /// Disposition the shell uses for its own purposes when no trap is set
    pub internal: Option<Disposition>,
    /// Action that was effective in the parent environment
    pub parent_action: Option<Action>,
    running: usize,
    retired: Vec<Rc<str>>,
}

impl SlotState {
    /// Replaces the action and updates the mode flags accordingly.
    ///
    /// If the trap command is running, the old command text is kept alive
    /// until [`finish_running`](Self::finish_running) so that the running
    /// evaluation never sees its source freed.
    pub fn set(&mut self, action: Action, origin: Option<Location>) {
        self.mode
            .remove(SignalMode::TRAPPED | SignalMode::IGNORED | SignalMode::INHERITED);
        match &action {
            Action::Default => (),
            Action::Ignore => self.mode.insert(SignalMode::IGNORED),
            Action::Command(_) => self.mode.insert(SignalMode::TRAPPED),
        }

        let old = std::mem::replace(&mut self.action, action);
        if let Action::Command(text) = old {
            if self.mode.contains(SignalMode::INPROGRESS) {
                self.retired.push(text);
                self.mode.insert(SignalMode::CHANGED);
            }
        }
        self.origin = origin;
    }

    /// Marks the trap command as running.
    pub fn begin_running(&mut self) {
        self.running += 1;
        self.mode.insert(SignalMode::INPROGRESS);
    }

    /// Marks the end of a trap command run.
    ///
    /// When the outermost run ends, command texts replaced during the run are
    /// released.
    pub fn finish_running(&mut self) {
        self.running = self.running.saturating_sub(1);
        if self.running == 0 {
            self.mode.remove(SignalMode::INPROGRESS);
            if self.mode.contains(SignalMode::CHANGED) {
                self.retired.clear();
                self.mode.remove(SignalMode::CHANGED);
            }
        }
    }

    /// Returns the number of replaced command texts awaiting release.
    #[must_use]
    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    /// Computes the disposition the signal should have.
    #[must_use]
    pub fn disposition(&self) -> Disposition {
        if self.mode.contains(SignalMode::NO_TRAP) {
            return Disposition::Catch;
        }
        if self.mode.contains(SignalMode::HARD_IGNORE) {
            return Disposition::Ignore;
        }
        match self.action {
            Action::Command(_) => Disposition::Catch,
            Action::Ignore => Disposition::Ignore,
            Action::Default => self
                .internal
                .or(self.original)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_updates_mode_flags() {
        let mut slot = SlotState::default();
        slot.set(Action::Command("echo".into()), Some(Location::dummy()));
        assert!(slot.mode.contains(SignalMode::TRAPPED));
        assert_eq!(slot.disposition(), Disposition::Catch);

        slot.set(Action::Ignore, None);
        assert!(!slot.mode.contains(SignalMode::TRAPPED));
        assert!(slot.mode.contains(SignalMode::IGNORED));
        assert_eq!(slot.disposition(), Disposition::Ignore);
        assert_eq!(slot.origin, None);

        slot.set(Action::Default, None);
        assert_eq!(slot.mode, SignalMode::empty());
        assert_eq!(slot.disposition(), Disposition::Default);
    }

    #[test]
    fn replaced_command_survives_until_run_finishes() {
        let mut slot = SlotState::default();
        let text: Rc<str> = "echo old".into();
        let weak = Rc::downgrade(&text);
        slot.set(Action::Command(text), None);

        slot.begin_running();
        slot.set(Action::Command("echo new".into()), None);
        assert!(slot.mode.contains(SignalMode::CHANGED));
        assert_eq!(slot.retired_count(), 1);
        assert!(weak.upgrade().is_some());

        slot.finish_running();
        assert!(!slot.mode.contains(SignalMode::INPROGRESS));
        assert!(!slot.mode.contains(SignalMode::CHANGED));
        assert_eq!(slot.retired_count(), 0);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn nested_runs_release_at_outermost_finish() {
        let mut slot = SlotState::default();
        slot.set(Action::Command("a".into()), None);
        slot.begin_running();
        slot.begin_running();
        slot.set(Action::Default, None);
        slot.finish_running();
        assert!(slot.mode.contains(SignalMode::INPROGRESS));
        assert_eq!(slot.retired_count(), 1);
        slot.finish_running();
        assert_eq!(slot.retired_count(), 0);
    }

    #[test]
    fn command_replaced_while_idle_is_dropped() {
        let mut slot = SlotState::default();
        let text: Rc<str> = "echo".into();
        let weak = Rc::downgrade(&text);
        slot.set(Action::Command(text), None);
        slot.set(Action::Ignore, None);
        assert!(weak.upgrade().is_none());
        assert!(!slot.mode.contains(SignalMode::CHANGED));
    }

    #[test]
    fn disposition_precedence() {
        let mut slot = SlotState {
            original: Some(Disposition::Ignore),
            ..SlotState::default()
        };
        assert_eq!(slot.disposition(), Disposition::Ignore);

        slot.internal = Some(Disposition::Catch);
        assert_eq!(slot.disposition(), Disposition::Catch);

        slot.mode.insert(SignalMode::HARD_IGNORE);
        assert_eq!(slot.disposition(), Disposition::Ignore);

        slot.mode.insert(SignalMode::NO_TRAP);
        assert_eq!(slot.disposition(), Disposition::Catch);
    }
}
