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

//! Signal and condition trap settings
//!
//! A [`TrapSet`] remembers the [`Action`] configured for each [`Condition`]
//! and manages the signal dispositions installed in the underlying
//! [`System`].
//!
//! `TrapSet` manages two kinds of signal handling. One is user-defined traps,
//! which are configured by the trap built-in. The other is internal handlers,
//! which the shell installs to implement its own behavior: interactive
//! interrupt handling, ignoring terminal-generated signals, and reaping
//! children on `SIGCHLD`. `TrapSet` merges the two into a single
//! [`Disposition`] for each signal.
//!
//! Every disposition change is made while the signal is blocked with a
//! [`SignalBlock`].

mod cond;
mod guard;
mod state;

pub use self::cond::{Condition, ParseConditionError};
pub use self::guard::{DEFAULT_CEILING, RecursionGuard};
pub use self::state::{Action, SetActionError, SignalMode, SlotState};
use crate::signal::Number;
use crate::system::{Disposition, Errno, SignalBlock, System};
use std::collections::BTreeMap;
use std::rc::Rc;
use tsh_syntax::source::Location;

/// Signals the shell ignores while interactive
const INTERACTIVE_IGNORED: [Number; 2] = [Number::SIGQUIT, Number::SIGTERM];

/// Signals the shell ignores while job control is on
const JOB_CONTROL_IGNORED: [Number; 3] = [Number::SIGTSTP, Number::SIGTTIN, Number::SIGTTOU];

/// Collection of trap settings
#[derive(Clone, Debug, Default)]
pub struct TrapSet {
    slots: BTreeMap<Condition, SlotState>,
    override_ignore: bool,
}

impl TrapSet {
    /// Sets whether signals ignored on entry to the shell may be trapped.
    ///
    /// This should be true for interactive shells only. It affects signals
    /// whose original disposition has not yet been captured.
    pub fn set_override_ignore(&mut self, override_ignore: bool) {
        self.override_ignore = override_ignore;
    }

    /// Records the disposition the signal had before the shell touched it.
    ///
    /// This function does nothing for a slot that has already been captured.
    /// A signal found ignored in a non-interactive shell is marked
    /// [`HARD_IGNORE`](SignalMode::HARD_IGNORE).
    pub fn capture_original(
        &mut self,
        system: &dyn System,
        cond: Condition,
    ) -> Result<&mut SlotState, Errno> {
        let override_ignore = self.override_ignore;
        let slot = self.slots.entry(cond).or_default();
        if let Condition::Signal(signal) = cond {
            if slot.original.is_none() {
                let disposition = match system.get_sigaction(signal)? {
                    Disposition::Catch => Disposition::Default,
                    disposition => disposition,
                };
                slot.original = Some(disposition);
                if disposition == Disposition::Ignore && !override_ignore {
                    slot.mode.insert(SignalMode::HARD_IGNORE);
                }
            }
        }
        Ok(slot)
    }

    fn update(
        &mut self,
        system: &dyn System,
        cond: Condition,
        action: Action,
        origin: Option<Location>,
    ) -> Result<(), SetActionError> {
        let Condition::Signal(signal) = cond else {
            self.slots.entry(cond).or_default().set(action, origin);
            return Ok(());
        };

        if signal == Number::SIGKILL || signal == Number::SIGSTOP {
            return match action {
                Action::Default => Ok(()),
                _ if signal == Number::SIGKILL => Err(SetActionError::SIGKILL),
                _ => Err(SetActionError::SIGSTOP),
            };
        }

        let _block = SignalBlock::new(system, signal)?;
        let slot = self.capture_original(system, cond)?;
        if slot.mode.contains(SignalMode::HARD_IGNORE) {
            log::debug!("trap for {cond} unchanged: ignored since startup");
            return match action {
                Action::Default => Ok(()),
                _ => Err(SetActionError::InitiallyIgnored),
            };
        }

        slot.set(action, origin);
        if !slot.mode.contains(SignalMode::NO_TRAP) {
            system.sigaction(signal, slot.disposition())?;
        }
        Ok(())
    }

    /// Sets a command to run when the condition is met.
    ///
    /// For a signal condition, the signal handler is installed unless the
    /// shell already catches the signal for internal purposes.
    pub fn set_trap(
        &mut self,
        system: &dyn System,
        cond: Condition,
        command: Rc<str>,
        origin: Option<Location>,
    ) -> Result<(), SetActionError> {
        log::debug!("setting trap for {cond}: {command}");
        self.update(system, cond, Action::Command(command), origin)
    }

    /// Makes the condition ignored.
    pub fn ignore_trap(
        &mut self,
        system: &dyn System,
        cond: Condition,
        origin: Option<Location>,
    ) -> Result<(), SetActionError> {
        log::debug!("ignoring {cond}");
        self.update(system, cond, Action::Ignore, origin)
    }

    /// Resets the condition to its default action.
    ///
    /// The signal disposition returns to the shell's own handler if one is
    /// enabled, or to the original disposition otherwise. Reverting a
    /// signal ignored since startup is a no-op.
    pub fn revert_trap(
        &mut self,
        system: &dyn System,
        cond: Condition,
        origin: Option<Location>,
    ) -> Result<(), SetActionError> {
        log::debug!("resetting trap for {cond}");
        self.update(system, cond, Action::Default, origin)
    }

    /// Returns the current action for the condition.
    #[must_use]
    pub fn get_action(&self, cond: Condition) -> Action {
        self.slots
            .get(&cond)
            .map(|slot| slot.action.clone())
            .unwrap_or_default()
    }

    /// Returns the command set for the condition, if any.
    #[must_use]
    pub fn command(&self, cond: Condition) -> Option<Rc<str>> {
        match &self.slots.get(&cond)?.action {
            Action::Command(command) => Some(Rc::clone(command)),
            _ => None,
        }
    }

    /// Returns the location of the command that set the current action.
    #[must_use]
    pub fn origin(&self, cond: Condition) -> Option<&Location> {
        self.slots.get(&cond)?.origin.as_ref()
    }

    /// Returns the mode flags of the condition.
    #[must_use]
    pub fn mode(&self, cond: Condition) -> SignalMode {
        self.slots
            .get(&cond)
            .map(|slot| slot.mode)
            .unwrap_or_default()
    }

    /// Whether a command is set for the condition.
    #[must_use]
    pub fn is_trapped(&self, cond: Condition) -> bool {
        self.mode(cond).contains(SignalMode::TRAPPED)
    }

    /// Returns the state of the condition.
    #[must_use]
    pub fn get_state(&self, cond: Condition) -> Option<&SlotState> {
        self.slots.get(&cond)
    }

    /// Returns an iterator over all known conditions in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Condition, &SlotState)> {
        self.slots.iter()
    }

    /// Resets the EXIT trap and returns the command that was set.
    ///
    /// This ensures the EXIT trap runs at most once.
    pub fn take_exit_trap(&mut self) -> Option<(Rc<str>, Option<Location>)> {
        let slot = self.slots.get_mut(&Condition::Exit)?;
        let Action::Command(command) = &slot.action else {
            return None;
        };
        let command = Rc::clone(command);
        let origin = slot.origin.clone();
        slot.set(Action::Default, None);
        Some((command, origin))
    }

    /// Marks the trap for the condition as running.
    pub fn begin_running(&mut self, cond: Condition) {
        self.slots.entry(cond).or_default().begin_running();
    }

    /// Marks the end of a trap run started by [`begin_running`](Self::begin_running).
    pub fn finish_running(&mut self, cond: Condition) {
        if let Some(slot) = self.slots.get_mut(&cond) {
            slot.finish_running();
        }
    }

    /// Installs the shell's own handler for `SIGINT`.
    ///
    /// An interactive shell calls this before reading each command so that
    /// an interrupt abandons the current command line. A trap set for
    /// `SIGINT` takes precedence over the handler.
    pub fn enable_interrupt_handler(&mut self, system: &dyn System) -> Result<(), Errno> {
        let signal = Number::SIGINT;
        let _block = SignalBlock::new(system, signal)?;
        let slot = self.capture_original(system, signal.into())?;
        slot.internal = Some(Disposition::Catch);
        slot.mode.insert(SignalMode::SPECIAL);
        system.sigaction(signal, slot.disposition())?;
        Ok(())
    }

    /// Makes the shell ignore terminal-generated signals it must not die from.
    ///
    /// An interactive shell ignores `SIGQUIT` and `SIGTERM`. A shell with job
    /// control ignores `SIGTSTP`, `SIGTTIN`, and `SIGTTOU`. Traps set for
    /// these signals take precedence.
    pub fn enable_special_handlers(
        &mut self,
        system: &dyn System,
        interactive: bool,
        job_control: bool,
    ) -> Result<(), Errno> {
        let mut signals = Vec::new();
        if interactive {
            signals.extend(INTERACTIVE_IGNORED);
        }
        if job_control {
            signals.extend(JOB_CONTROL_IGNORED);
        }
        for signal in signals {
            let _block = SignalBlock::new(system, signal)?;
            let slot = self.capture_original(system, signal.into())?;
            slot.internal = Some(Disposition::Ignore);
            slot.mode.insert(SignalMode::SPECIAL);
            system.sigaction(signal, slot.disposition())?;
        }
        Ok(())
    }

    /// Installs the internal handler for `SIGCHLD`.
    ///
    /// The shell keeps catching `SIGCHLD` regardless of the trap set for it,
    /// so the slot is marked [`NO_TRAP`](SignalMode::NO_TRAP). A second call
    /// is a no-op.
    pub fn enable_sigchld_handler(&mut self, system: &dyn System) -> Result<(), Errno> {
        let signal = Number::SIGCHLD;
        let _block = SignalBlock::new(system, signal)?;
        let slot = self.capture_original(system, signal.into())?;
        if slot.mode.contains(SignalMode::NO_TRAP) {
            return Ok(());
        }
        slot.internal = Some(Disposition::Catch);
        slot.mode.insert(SignalMode::NO_TRAP);
        system.sigaction(signal, slot.disposition())?;
        Ok(())
    }

    /// Uninstalls all internal handlers.
    ///
    /// Handlers for user-defined traps are left intact.
    pub fn disable_internal_handlers(&mut self, system: &dyn System) -> Result<(), Errno> {
        for (cond, slot) in &mut self.slots {
            let Condition::Signal(signal) = *cond else {
                continue;
            };
            if !slot
                .mode
                .intersects(SignalMode::SPECIAL | SignalMode::NO_TRAP)
            {
                continue;
            }
            let _block = SignalBlock::new(system, signal)?;
            slot.mode.remove(SignalMode::SPECIAL | SignalMode::NO_TRAP);
            slot.internal = None;
            system.sigaction(signal, slot.disposition())?;
        }
        Ok(())
    }

    /// Resets traps for a new subshell.
    ///
    /// Signal traps with a command revert to the original disposition while
    /// ignored signals stay ignored. The EXIT trap is always reset. DEBUG and
    /// RETURN traps are kept only if `keep_debug_return` is true (the
    /// `functrace` option), and the ERR trap only if `keep_err` is true (the
    /// `errtrace` option). Kept actions are marked
    /// [`INHERITED`](SignalMode::INHERITED). The previous actions are
    /// remembered as [`SlotState::parent_action`] so that the trap built-in
    /// can still report them.
    pub fn enter_subshell(
        &mut self,
        system: &dyn System,
        keep_debug_return: bool,
        keep_err: bool,
    ) -> Result<(), Errno> {
        self.disable_internal_handlers(system)?;

        for (cond, slot) in &mut self.slots {
            slot.parent_action = Some(slot.action.clone());
            let keep = match cond {
                Condition::Signal(_) => !matches!(slot.action, Action::Command(_)),
                Condition::Exit => false,
                Condition::Debug | Condition::Return => keep_debug_return,
                Condition::Err => keep_err,
            };
            if keep {
                if slot.action != Action::Default {
                    slot.mode.insert(SignalMode::INHERITED);
                }
                continue;
            }

            slot.set(Action::Default, None);
            if let Condition::Signal(signal) = *cond {
                let _block = SignalBlock::new(system, signal)?;
                system.sigaction(signal, slot.disposition())?;
            }
        }
        Ok(())
    }

    /// Restores original dispositions before the shell replaces itself with
    /// another program.
    ///
    /// Caught signals go back to their original disposition. Ignored signals
    /// stay ignored, since the ignore disposition survives `exec`.
    ///
    /// The read-eval loop never replaces the process image itself. This is
    /// for an `exec` implementation to call right before `execve`, after
    /// which the trap set is no longer used.
    pub fn restore_for_exec(&self, system: &dyn System) -> Result<(), Errno> {
        for (cond, slot) in &self.slots {
            let Condition::Signal(signal) = *cond else {
                continue;
            };
            if slot.disposition() == Disposition::Catch {
                let _block = SignalBlock::new(system, signal)?;
                system.sigaction(signal, slot.original.unwrap_or_default())?;
            }
        }
        Ok(())
    }

    /// Re-sends a caught signal whose trap is no longer set.
    ///
    /// A signal may be caught just before its trap is reset. In that case the
    /// signal is raised again with the original disposition so that its
    /// default effect happens as if the trap had never been set. Signals the
    /// shell handles internally or that are now ignored are dropped.
    pub fn redeliver(&mut self, system: &dyn System, signal: Number) -> Result<(), Errno> {
        let slot = self.capture_original(system, signal.into())?;
        if slot.action != Action::Default
            || slot
                .mode
                .intersects(SignalMode::SPECIAL | SignalMode::NO_TRAP | SignalMode::HARD_IGNORE)
        {
            return Ok(());
        }
        log::debug!("re-raising signal {signal} with its original disposition");
        let block = SignalBlock::new(system, signal)?;
        system.sigaction(signal, slot.original.unwrap_or_default())?;
        system.raise(signal)?;
        // The signal is delivered here unless the caller has it blocked.
        drop(block);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::r#virtual::VirtualSystem;
    use crate::system::Sigaction;
    use assert_matches::assert_matches;

    fn origin() -> Option<Location> {
        Some(Location::dummy())
    }

    #[test]
    fn setting_trap_installs_handler() {
        let system = VirtualSystem::new();
        let mut traps = TrapSet::default();
        let cond = Number::SIGUSR1.into();

        traps.set_trap(&system, cond, "echo".into(), origin()).unwrap();

        assert_eq!(traps.get_action(cond), Action::Command("echo".into()));
        assert!(traps.is_trapped(cond));
        assert_eq!(traps.origin(cond), origin().as_ref());
        assert_eq!(system.disposition(Number::SIGUSR1), Disposition::Catch);
        assert!(system.state.borrow().blocked.is_empty());
    }

    #[test]
    fn ignoring_and_reverting() {
        let system = VirtualSystem::new();
        let mut traps = TrapSet::default();
        let cond = Number::SIGHUP.into();

        traps.ignore_trap(&system, cond, origin()).unwrap();
        assert_eq!(traps.get_action(cond), Action::Ignore);
        assert!(traps.mode(cond).contains(SignalMode::IGNORED));
        assert_eq!(system.disposition(Number::SIGHUP), Disposition::Ignore);

        traps.revert_trap(&system, cond, origin()).unwrap();
        assert_eq!(traps.get_action(cond), Action::Default);
        assert_eq!(system.disposition(Number::SIGHUP), Disposition::Default);
    }

    #[test]
    fn sigkill_and_sigstop_cannot_be_trapped() {
        let system = VirtualSystem::new();
        let mut traps = TrapSet::default();

        let result = traps.set_trap(&system, Number::SIGKILL.into(), "".into(), None);
        assert_eq!(result, Err(SetActionError::SIGKILL));
        let result = traps.ignore_trap(&system, Number::SIGSTOP.into(), None);
        assert_eq!(result, Err(SetActionError::SIGSTOP));
        let result = traps.revert_trap(&system, Number::SIGKILL.into(), None);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn initially_ignored_signal_in_non_interactive_shell() {
        let system = VirtualSystem::new();
        system.sigaction(Number::SIGQUIT, Disposition::Ignore).unwrap();
        let mut traps = TrapSet::default();
        let cond = Number::SIGQUIT.into();

        let result = traps.set_trap(&system, cond, "echo".into(), None);
        assert_eq!(result, Err(SetActionError::InitiallyIgnored));
        assert_eq!(traps.get_action(cond), Action::Default);
        assert!(traps.mode(cond).contains(SignalMode::HARD_IGNORE));
        assert_eq!(system.disposition(Number::SIGQUIT), Disposition::Ignore);

        // Reverting is silently accepted and changes nothing.
        assert_eq!(traps.revert_trap(&system, cond, None), Ok(()));
        assert_eq!(system.disposition(Number::SIGQUIT), Disposition::Ignore);
    }

    #[test]
    fn initially_ignored_signal_in_interactive_shell() {
        let system = VirtualSystem::new();
        system.sigaction(Number::SIGQUIT, Disposition::Ignore).unwrap();
        let mut traps = TrapSet::default();
        traps.set_override_ignore(true);
        let cond = Number::SIGQUIT.into();

        traps.set_trap(&system, cond, "echo".into(), None).unwrap();
        assert_eq!(system.disposition(Number::SIGQUIT), Disposition::Catch);

        traps.revert_trap(&system, cond, None).unwrap();
        assert_eq!(system.disposition(Number::SIGQUIT), Disposition::Ignore);
    }

    #[test]
    fn pseudo_signals_have_no_disposition() {
        let system = VirtualSystem::new();
        let mut traps = TrapSet::default();
        for cond in [
            Condition::Exit,
            Condition::Debug,
            Condition::Err,
            Condition::Return,
        ] {
            traps.set_trap(&system, cond, "echo".into(), None).unwrap();
            assert!(traps.is_trapped(cond));
        }
        assert_eq!(system.state.borrow().sigaction_calls, 0);
    }

    #[test]
    fn take_exit_trap_runs_once() {
        let system = VirtualSystem::new();
        let mut traps = TrapSet::default();
        traps
            .set_trap(&system, Condition::Exit, "echo bye".into(), origin())
            .unwrap();

        let (command, location) = traps.take_exit_trap().unwrap();
        assert_eq!(&*command, "echo bye");
        assert_eq!(location, origin());
        assert_eq!(traps.take_exit_trap(), None);
        assert_eq!(traps.get_action(Condition::Exit), Action::Default);
    }

    #[test]
    fn interrupt_handler_yields_to_trap() {
        let system = VirtualSystem::new();
        let mut traps = TrapSet::default();
        let cond = Number::SIGINT.into();

        traps.enable_interrupt_handler(&system).unwrap();
        assert_eq!(system.disposition(Number::SIGINT), Disposition::Catch);
        assert!(traps.mode(cond).contains(SignalMode::SPECIAL));

        traps.ignore_trap(&system, cond, None).unwrap();
        assert_eq!(system.disposition(Number::SIGINT), Disposition::Ignore);

        // Reverting returns to the shell's handler, not SIG_DFL.
        traps.revert_trap(&system, cond, None).unwrap();
        assert_eq!(system.disposition(Number::SIGINT), Disposition::Catch);

        traps.disable_internal_handlers(&system).unwrap();
        assert_eq!(system.disposition(Number::SIGINT), Disposition::Default);
    }

    #[test]
    fn special_handlers_ignore_signals() {
        let system = VirtualSystem::new();
        let mut traps = TrapSet::default();
        traps.enable_special_handlers(&system, true, false).unwrap();
        assert_eq!(system.disposition(Number::SIGTERM), Disposition::Ignore);
        assert_eq!(system.disposition(Number::SIGQUIT), Disposition::Ignore);
        assert_eq!(system.disposition(Number::SIGTSTP), Disposition::Default);

        traps.enable_special_handlers(&system, false, true).unwrap();
        assert_eq!(system.disposition(Number::SIGTSTP), Disposition::Ignore);
        assert_eq!(system.disposition(Number::SIGTTOU), Disposition::Ignore);

        traps
            .set_trap(&system, Number::SIGTERM.into(), "echo".into(), None)
            .unwrap();
        assert_eq!(system.disposition(Number::SIGTERM), Disposition::Catch);
    }

    #[test]
    fn sigchld_trap_does_not_change_disposition() {
        let system = VirtualSystem::new();
        let mut traps = TrapSet::default();
        let cond = Number::SIGCHLD.into();

        traps.enable_sigchld_handler(&system).unwrap();
        assert_eq!(system.disposition(Number::SIGCHLD), Disposition::Catch);
        let calls = system.state.borrow().sigaction_calls;

        traps.set_trap(&system, cond, "echo".into(), None).unwrap();
        traps.ignore_trap(&system, cond, None).unwrap();
        traps.revert_trap(&system, cond, None).unwrap();
        assert_eq!(system.state.borrow().sigaction_calls, calls);
        assert_eq!(system.disposition(Number::SIGCHLD), Disposition::Catch);

        // A second enable is a no-op.
        traps.enable_sigchld_handler(&system).unwrap();
        assert_eq!(system.state.borrow().sigaction_calls, calls);
    }

    #[test]
    fn entering_subshell_resets_traps() {
        let system = VirtualSystem::new();
        let mut traps = TrapSet::default();
        let usr1 = Number::SIGUSR1.into();
        let hup = Number::SIGHUP.into();
        traps.set_trap(&system, usr1, "echo usr1".into(), None).unwrap();
        traps.ignore_trap(&system, hup, None).unwrap();
        traps.set_trap(&system, Condition::Exit, "echo exit".into(), None).unwrap();
        traps.set_trap(&system, Condition::Debug, "echo debug".into(), None).unwrap();
        traps.set_trap(&system, Condition::Err, "echo err".into(), None).unwrap();
        traps.enable_sigchld_handler(&system).unwrap();

        traps.enter_subshell(&system, true, false).unwrap();

        assert_eq!(traps.get_action(usr1), Action::Default);
        assert_eq!(system.disposition(Number::SIGUSR1), Disposition::Default);
        assert_eq!(traps.get_action(hup), Action::Ignore);
        assert!(traps.mode(hup).contains(SignalMode::INHERITED));
        assert_eq!(system.disposition(Number::SIGHUP), Disposition::Ignore);
        assert_eq!(traps.get_action(Condition::Exit), Action::Default);
        assert_eq!(
            traps.get_action(Condition::Debug),
            Action::Command("echo debug".into())
        );
        assert!(traps.mode(Condition::Debug).contains(SignalMode::INHERITED));
        assert_eq!(traps.get_action(Condition::Err), Action::Default);
        assert_eq!(system.disposition(Number::SIGCHLD), Disposition::Default);

        assert_matches!(
            &traps.get_state(usr1).unwrap().parent_action,
            Some(Action::Command(command)) if &**command == "echo usr1"
        );
    }

    #[test]
    fn restoring_for_exec() {
        let system = VirtualSystem::new();
        let mut traps = TrapSet::default();
        traps
            .set_trap(&system, Number::SIGUSR1.into(), "echo".into(), None)
            .unwrap();
        traps.ignore_trap(&system, Number::SIGUSR2.into(), None).unwrap();
        traps.enable_sigchld_handler(&system).unwrap();

        traps.restore_for_exec(&system).unwrap();
        assert_eq!(system.disposition(Number::SIGUSR1), Disposition::Default);
        assert_eq!(system.disposition(Number::SIGUSR2), Disposition::Ignore);
        assert_eq!(system.disposition(Number::SIGCHLD), Disposition::Default);
    }

    #[test]
    fn redelivering_untrapped_signal() {
        let system = VirtualSystem::new();
        let mut traps = TrapSet::default();
        traps.redeliver(&system, Number::SIGUSR1).unwrap();
        assert_eq!(system.state.borrow().terminated_by, Some(Number::SIGUSR1));
        assert!(system.state.borrow().blocked.is_empty());
    }

    #[test]
    fn redelivered_signal_waits_for_callers_mask() {
        let system = VirtualSystem::new();
        let mut traps = TrapSet::default();
        let block = SignalBlock::new(&system, Number::SIGUSR1).unwrap();

        traps.redeliver(&system, Number::SIGUSR1).unwrap();
        assert_eq!(system.state.borrow().terminated_by, None);
        assert!(system.state.borrow().blocked.contains(&Number::SIGUSR1));

        drop(block);
        assert_eq!(system.state.borrow().terminated_by, Some(Number::SIGUSR1));
        assert!(system.state.borrow().blocked_pending.is_empty());
    }

    #[test]
    fn redelivering_ignored_signal_is_noop() {
        let system = VirtualSystem::new();
        let mut traps = TrapSet::default();
        traps.ignore_trap(&system, Number::SIGUSR1.into(), None).unwrap();
        traps.redeliver(&system, Number::SIGUSR1).unwrap();
        assert_eq!(system.state.borrow().terminated_by, None);
    }

    #[test]
    fn replacing_running_trap_defers_release() {
        let system = VirtualSystem::new();
        let mut traps = TrapSet::default();
        let cond = Number::SIGUSR1.into();
        let text: Rc<str> = "echo old".into();
        let weak = Rc::downgrade(&text);
        traps.set_trap(&system, cond, text, None).unwrap();

        traps.begin_running(cond);
        traps.set_trap(&system, cond, "echo new".into(), None).unwrap();
        assert!(traps.mode(cond).contains(SignalMode::CHANGED));
        assert!(weak.upgrade().is_some());

        traps.finish_running(cond);
        assert!(weak.upgrade().is_none());
        assert!(!traps.mode(cond).contains(SignalMode::INPROGRESS));
    }
}
