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

//! Running the EXIT trap

use super::run_trap;
use crate::ExitStatus;
use std::ops::ControlFlow::{Break, Continue};
use tsh_env::Env;
use tsh_env::trap::Condition;

/// Runs the EXIT trap, if any, and returns the exit status the shell should
/// exit with.
///
/// The trap is reset before the action runs, so it runs at most once in the
/// environment. If the action exits the shell with an exit status, that
/// status becomes the result. Otherwise, the result is `$?` as of the
/// entry to this function.
///
/// This function also sets `$?` to the result.
pub fn run_exit_trap(env: &mut Env) -> ExitStatus {
    let entry_status = env.exit_status;
    let Some((command, origin)) = env.traps.take_exit_trap() else {
        return entry_status;
    };

    let exit_status = match run_trap(env, Condition::Exit, command, origin) {
        Continue(_) => entry_status,
        Break(divert) if divert.is_exit() => divert.exit_status().unwrap_or(entry_status),
        Break(divert) => {
            log::debug!("ignoring {divert:?} from the EXIT trap");
            entry_status
        }
    };
    env.exit_status = exit_status;
    exit_status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::env_with_builtins;
    use std::rc::Rc;
    use tsh_env_test_helper::assert_stdout;

    fn set_exit_trap(env: &mut Env, command: &str) {
        let system = Rc::clone(&env.system);
        env.traps
            .set_trap(&*system, Condition::Exit, command.into(), None)
            .unwrap();
    }

    #[test]
    fn no_exit_trap() {
        let (mut env, _system) = env_with_builtins();
        env.exit_status = ExitStatus(4);
        assert_eq!(run_exit_trap(&mut env), ExitStatus(4));
    }

    #[test]
    fn exit_trap_keeps_entry_status() {
        let (mut env, system) = env_with_builtins();
        set_exit_trap(&mut env, "echo $?; status 9");
        env.exit_status = ExitStatus(1);
        assert_eq!(run_exit_trap(&mut env), ExitStatus(1));
        assert_eq!(env.exit_status, ExitStatus(1));
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, "1\n"));
    }

    #[test]
    fn exit_in_exit_trap_overrides_status() {
        let (mut env, _system) = env_with_builtins();
        set_exit_trap(&mut env, "exit 3");
        env.exit_status = ExitStatus(1);
        assert_eq!(run_exit_trap(&mut env), ExitStatus(3));
        assert_eq!(env.exit_status, ExitStatus(3));
    }

    #[test]
    fn exit_without_operand_in_exit_trap() {
        let (mut env, _system) = env_with_builtins();
        set_exit_trap(&mut env, "status 8; exit");
        env.exit_status = ExitStatus(1);
        assert_eq!(run_exit_trap(&mut env), ExitStatus(1));
    }

    #[test]
    fn exit_trap_runs_at_most_once() {
        let (mut env, system) = env_with_builtins();
        set_exit_trap(&mut env, "echo bye");
        run_exit_trap(&mut env);
        run_exit_trap(&mut env);
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, "bye\n"));
        assert!(!env.traps.is_trapped(Condition::Exit));
    }

    #[test]
    fn return_in_exit_trap_is_ignored() {
        let (mut env, system) = env_with_builtins();
        set_exit_trap(&mut env, "echo a; return 5; echo b");
        env.exit_status = ExitStatus(2);
        assert_eq!(run_exit_trap(&mut env), ExitStatus(2));
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, "a\n"));
    }
}
