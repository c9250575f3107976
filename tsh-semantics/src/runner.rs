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

//! Reading and evaluating source code
//!
//! [`evaluate`] parses and executes code held in memory. It is the common
//! primitive of the `eval` built-in ([`eval_string`]), the `.` built-in
//! ([`source_file`]), function calls and trap actions. [`ReadEvalLoop`] is
//! the top-level loop that reads commands from the shell's input and runs
//! the EXIT trap when the input ends or the shell exits.
//!
//! Between commands, the evaluators run pending traps, which makes the loop
//! top a safe point.

use crate::Handle;
use crate::command::execute;
use crate::trap::{ReturnKind, run_exit_trap, run_pending_traps, run_return_trap};
use crate::{Divert, ExitStatus, Result};
use bitflags::bitflags;
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;
use tsh_env::Env;
use tsh_env::option::{History, Interactive, OneCommand, Off, State};
use tsh_env::stack::Frame;
use tsh_env::trap::Condition;
use tsh_env::unwind::UnwindGuard;
use tsh_syntax::input::{Input, Memory};
use tsh_syntax::parser::Parser;
use tsh_syntax::source::{Location, Source};

bitflags! {
    /// Options that modify the behavior of [`evaluate`]
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct EvalFlags: u8 {
        /// Turns the `interactive` option off while the code runs.
        const NON_INTERACTIVE = 1 << 0;
        /// Turns the `history` option off while the code runs.
        const NO_HISTORY = 1 << 1;
        /// Numbers the lines of the code from 1 rather than continuing from
        /// the current line number.
        const RESET_LINE = 1 << 2;
        /// Stops after the first command.
        const ONE_COMMAND = 1 << 3;
        /// The code is a trap action.
        ///
        /// A `Discard` never escapes a trap action, even in a subshell.
        const TRAP = 1 << 4;
    }
}

/// Part of the environment that `evaluate` puts back
#[derive(Clone, Copy, Debug)]
struct Saved {
    eval_depth: usize,
    interactive: State,
    history: State,
    line_number: u64,
}

impl Saved {
    fn capture(env: &Env) -> Self {
        Saved {
            eval_depth: env.eval_depth,
            interactive: env.options.get(Interactive),
            history: env.options.get(History),
            line_number: env.line_number,
        }
    }

    fn restore(self, env: &mut Env) {
        env.eval_depth = self.eval_depth;
        env.options.set(Interactive, self.interactive);
        env.options.set(History, self.history);
        env.line_number = self.line_number;
    }

    /// Puts back only what `evaluate` itself changed.
    fn restore_overrides(self, env: &mut Env, flags: EvalFlags) {
        env.eval_depth = self.eval_depth;
        env.line_number = self.line_number;
        if flags.contains(EvalFlags::NON_INTERACTIVE) {
            env.options.set(Interactive, self.interactive);
        }
        if flags.contains(EvalFlags::NO_HISTORY) {
            env.options.set(History, self.history);
        }
    }
}

/// Outcome of a successful [`step`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Step {
    Executed,
    Interrupted,
    EndOfInput,
}

/// Runs pending traps, then parses and executes one command.
fn step(env: &mut Env, parser: &mut Parser, record_history: bool) -> Result<Step> {
    run_pending_traps(env)?;

    let command = match parser.command_line() {
        Ok(Some(command)) => command,
        Ok(None) => return Continue(Step::EndOfInput),
        Err(error) if error.cause.is_interrupted() => return Continue(Step::Interrupted),
        Err(error) => {
            error.handle(env)?;
            return Continue(Step::Executed);
        }
    };

    if record_history && env.is_interactive() && env.options.is_on(History) {
        env.history.push(command.to_string());
    }
    execute(env, &command)?;
    Continue(Step::Executed)
}

/// Sets `$?` for a caught `Discard`.
fn apply_discard(env: &mut Env, exit_status: Option<ExitStatus>) {
    match exit_status {
        Some(exit_status) => env.exit_status = exit_status,
        None if env.exit_status.is_successful() => env.exit_status = ExitStatus::FAILURE,
        None => (),
    }
}

fn report_unhandled(env: &mut Env) {
    log::error!("unhandled control transfer");
    env.print_error("internal error: unhandled control transfer");
}

/// Decides what an inner evaluator does with a `Divert`.
///
/// Returns `Continue` if the evaluation should go on with the next command.
fn catch(env: &mut Env, divert: Divert, flags: EvalFlags) -> Result {
    match divert {
        Divert::Discard(exit_status) => {
            apply_discard(env, exit_status);
            if env.stack.in_subshell() && !flags.contains(EvalFlags::TRAP) {
                Break(divert)
            } else {
                Continue(())
            }
        }

        Divert::Unhandled => {
            report_unhandled(env);
            catch(env, Divert::Discard(None), flags)
        }

        Divert::ExitFromBuiltin(exit_status)
            if env.stack.in_function() && env.traps.is_trapped(Condition::Exit) =>
        {
            if let Some(exit_status) = exit_status {
                env.exit_status = exit_status;
            }
            let exit_status = run_exit_trap(env);
            Break(Divert::Exit(Some(exit_status)))
        }

        Divert::Return(_)
        | Divert::ForceEndOfInput(_)
        | Divert::ErrExit(_)
        | Divert::ExitFromBuiltin(_)
        | Divert::Exit(_) => Break(divert),
    }
}

/// Parses and executes the code.
///
/// This function runs pending traps before each command, then parses and
/// executes it. A syntax error or a `Divert::Discard` abandons the current
/// command only; the evaluation continues with the next one. Other diverts
/// end the evaluation and are returned to the caller, except that `exit`
/// inside a function with an EXIT trap set runs the trap right away and is
/// returned as `Divert::Exit`.
///
/// If the code contains no commands, the exit status is set to zero.
///
/// The evaluation depth, the `interactive` and `history` options and the
/// line number are put back when this function returns. The depth of
/// nested evaluations is bounded by [`Limits::eval_depth`](tsh_env::limits::Limits).
pub fn evaluate(env: &mut Env, code: &str, source: Rc<Source>, flags: EvalFlags) -> Result {
    if env.eval_depth >= env.limits.eval_depth {
        env.print_error("evaluation nested too deeply");
        env.exit_status = ExitStatus::ERROR;
        return Break(Divert::Discard(Some(ExitStatus::ERROR)));
    }

    let saved = Saved::capture(env);
    let mut env = env.begin_frame("evaluate");
    env.protect(move |env| saved.restore(env));
    env.eval_depth += 1;
    if flags.contains(EvalFlags::NON_INTERACTIVE) {
        env.options.set(Interactive, Off);
    }
    if flags.contains(EvalFlags::NO_HISTORY) {
        env.options.set(History, Off);
    }

    let start_line = if flags.contains(EvalFlags::RESET_LINE) {
        1
    } else {
        env.line_number.max(1)
    };
    let mut parser = Parser::new(Box::new(Memory::new(code)), source, start_line);

    let mut executed = false;
    loop {
        match step(&mut env, &mut parser, false) {
            Continue(Step::Executed) => executed = true,
            Continue(Step::Interrupted) => continue,
            Continue(Step::EndOfInput) => break,
            Break(divert) => {
                executed = true;
                catch(&mut env, divert, flags)?;
            }
        }
        if executed && flags.contains(EvalFlags::ONE_COMMAND) {
            break;
        }
    }
    if !executed {
        env.exit_status = ExitStatus::SUCCESS;
    }

    saved.restore_overrides(&mut env, flags);
    UnwindGuard::discard(env);
    Continue(())
}

/// Evaluates the code as the `eval` built-in does.
///
/// `origin` is the location of the `eval` command. Inside a function or dot
/// script, a `return` in the code returns from the enclosing function or dot
/// script.
pub fn eval_string(env: &mut Env, code: &str, origin: Location) -> Result {
    let returnable = env.return_catch_depth > 0;
    let mut env = env.push_frame(Frame::Eval { returnable });
    let mut env = env.begin_frame("eval");
    if returnable {
        env.return_catch_depth += 1;
        env.protect(|env| env.return_catch_depth -= 1);
    }

    let source = Rc::new(Source::Eval { original: origin });
    let result = evaluate(&mut env, code, source, EvalFlags::empty());
    UnwindGuard::run(env);
    result
}

/// Reads and evaluates the file as the `.` built-in does.
///
/// `origin` is the location of the `.` command. A `return` in the file ends
/// the evaluation, after which the RETURN trap runs. If the file cannot be
/// read, an error message is printed and the exit status is set to 1.
pub fn source_file(env: &mut Env, path: &str, origin: Location) -> Result {
    let code = match env.system.read_file(path) {
        Ok(code) => code,
        Err(errno) => {
            env.print_error_at(&origin, &format!("cannot open `{path}`: {errno}"));
            env.exit_status = ExitStatus::FAILURE;
            return Continue(());
        }
    };

    let mut env = env.push_frame(Frame::DotScript);
    let mut env = env.begin_frame("dot script");
    env.return_catch_depth += 1;
    env.protect(|env| env.return_catch_depth -= 1);

    let name = path.to_owned();
    let source = Rc::new(Source::DotScript { name, origin });
    match evaluate(&mut env, &code, source, EvalFlags::RESET_LINE) {
        Continue(()) => (),
        Break(Divert::Return(exit_status)) => {
            if let Some(exit_status) = exit_status {
                env.exit_status = exit_status;
            }
        }
        Break(divert) => return Break(divert),
    }

    run_return_trap(&mut env, ReturnKind::DotScript)?;
    UnwindGuard::run(env);
    Continue(())
}

/// Top-level read-eval loop
///
/// A read-eval loop reads commands from the input and executes them until
/// the input ends or the shell exits. Unlike [`evaluate`], the loop catches
/// `Discard` and `Return` even in a subshell, and it runs the EXIT trap
/// before returning the final exit status.
///
/// In an interactive shell, the loop reinstalls the shell's `SIGINT` handler
/// before each command so that an interrupt abandons the command line being
/// edited, and records each command in [`Env::history`] while the `history`
/// option is on.
///
/// ```
/// # use std::rc::Rc;
/// # use tsh_env::Env;
/// # use tsh_semantics::{ExitStatus, ReadEvalLoop};
/// # use tsh_syntax::input::Memory;
/// # use tsh_syntax::source::Source;
/// let mut env = Env::new_virtual();
/// let input = Box::new(Memory::new("undefined_command"));
/// let exit_status = ReadEvalLoop::new(&mut env, input, Rc::new(Source::Stdin)).run();
/// assert_eq!(exit_status, ExitStatus::NOT_FOUND);
/// ```
#[must_use = "the loop does nothing until run"]
pub struct ReadEvalLoop<'a> {
    env: &'a mut Env,
    parser: Parser,
}

impl<'a> ReadEvalLoop<'a> {
    /// Creates a new read-eval loop that reads from the input.
    pub fn new(env: &'a mut Env, input: Box<dyn Input>, source: Rc<Source>) -> Self {
        let parser = Parser::new(input, source, 1);
        ReadEvalLoop { env, parser }
    }

    fn reinstall_interrupt_handler(&mut self) {
        let system = Rc::clone(&self.env.system);
        if let Err(errno) = self.env.traps.enable_interrupt_handler(&*system) {
            log::warn!("cannot install the interrupt handler: {errno}");
        }
    }

    /// Runs the loop and returns the exit status the shell should exit with.
    pub fn run(mut self) -> ExitStatus {
        let end = loop {
            if self.env.is_interactive() {
                self.reinstall_interrupt_handler();
            }

            let env = &mut *self.env;
            match step(env, &mut self.parser, true) {
                Continue(Step::Executed) => (),
                Continue(Step::Interrupted) => continue,
                Continue(Step::EndOfInput) => break None,
                Break(Divert::Discard(exit_status)) => apply_discard(env, exit_status),
                Break(Divert::Unhandled) => {
                    report_unhandled(env);
                    apply_discard(env, None);
                }
                Break(Divert::Return(exit_status)) => {
                    if let Some(exit_status) = exit_status {
                        env.exit_status = exit_status;
                    }
                }
                Break(divert) => break Some(divert),
            }

            if env.options.is_on(OneCommand) {
                break Some(Divert::ForceEndOfInput(None));
            }
        };

        let env = &mut *self.env;
        if let Some(divert) = end {
            log::debug!("leaving the read-eval loop: {divert:?}");
            if let Some(exit_status) = divert.exit_status() {
                env.exit_status = exit_status;
            }
        }
        run_exit_trap(env)
    }
}

/// Runs a [`ReadEvalLoop`] on the input.
pub fn read_eval_loop(env: &mut Env, input: Box<dyn Input>, source: Rc<Source>) -> ExitStatus {
    ReadEvalLoop::new(env, input, source).run()
}
