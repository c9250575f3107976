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

//! Command execution
//!
//! [`execute`] runs one [`Command`]. A function definition defines the
//! function. A simple command goes through these steps:
//!
//! 1. Leading words of the form `NAME=value` are taken as assignments.
//! 2. The other words are expanded, each to one field.
//! 3. The DEBUG trap runs.
//! 4. If no fields remain, the assignments are performed permanently.
//!    Otherwise they are visible only while the command runs, and the
//!    command is searched for among special built-ins, functions and
//!    regular built-ins, in this order.
//! 5. The ERR trap runs if the command failed, and the `errexit` option
//!    takes effect.

use crate::runner::{EvalFlags, evaluate};
use crate::trap::{ReturnKind, run_debug_trap, run_err_trap, run_return_trap};
use crate::{Divert, ExitStatus, Field, Result};
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;
use tsh_env::Env;
use tsh_env::builtin::{Builtin, Type};
use tsh_env::function::{Function, HashEntry};
use tsh_env::option::ErrExit;
use tsh_env::stack::Frame;
use tsh_env::trap::Condition;
use tsh_env::unwind::UnwindGuard;
use tsh_syntax::parser::is_name;
use tsh_syntax::source::{Location, Source};
use tsh_syntax::syntax::{Command, Param, Word, WordUnit};

/// Expands a parameter to its value.
fn expand_param(env: &Env, param: &Param) -> String {
    match param {
        Param::ExitStatus => env.exit_status.to_string(),
        Param::Count => env.variables.positional_params().len().to_string(),
        Param::ProcessId => env.system.getpid().to_string(),
        Param::Positional(0) => env.arg0.clone(),
        Param::Positional(index) => env
            .variables
            .positional_params()
            .get(index - 1)
            .cloned()
            .unwrap_or_default(),
        Param::Variable(name) => env.lookup(name).unwrap_or_default().to_owned(),
    }
}

fn expand_units(env: &Env, units: &[WordUnit]) -> String {
    let mut value = String::new();
    for unit in units {
        match unit {
            WordUnit::Literal(literal) => value.push_str(literal),
            WordUnit::Param(param) => value.push_str(&expand_param(env, param)),
        }
    }
    value
}

/// Expands a word to a field.
pub fn expand_word(env: &Env, word: &Word) -> Field {
    Field {
        value: expand_units(env, &word.units),
        origin: word.location.clone(),
    }
}

/// Expands the word as an assignment if it has the form `NAME=value`.
fn expand_assignment(env: &Env, word: &Word) -> Option<(String, String)> {
    let (WordUnit::Literal(first), rest) = word.units.split_first()? else {
        return None;
    };
    let (name, head) = first.split_once('=')?;
    if !is_name(name) {
        return None;
    }
    let mut value = head.to_owned();
    value.push_str(&expand_units(env, rest));
    Some((name.to_owned(), value))
}

/// Executes the command.
///
/// This function sets `$?` to the exit status of the command.
pub fn execute(env: &mut Env, command: &Command) -> Result {
    match command {
        Command::FunctionDefinition {
            name,
            body,
            location,
        } => {
            env.line_number = location.line;
            let entry = HashEntry::new(name.clone(), Rc::clone(body), location.clone());
            env.functions.replace(entry);
            env.exit_status = ExitStatus::SUCCESS;
            Continue(())
        }
        Command::Simple { words, location } => execute_simple(env, words, location),
    }
}

fn execute_simple(env: &mut Env, words: &[Word], location: &Location) -> Result {
    env.line_number = location.line;

    let mut words = words.iter().peekable();
    let mut assignments = Vec::new();
    while let Some(assignment) = words.peek().and_then(|word| expand_assignment(env, word)) {
        assignments.push(assignment);
        words.next();
    }
    let fields = words.map(|word| expand_word(env, word)).collect::<Vec<_>>();

    if !run_debug_trap(env)? {
        return Continue(());
    }

    if fields.is_empty() {
        for (name, value) in assignments {
            env.variables.assign(name, value);
        }
        env.exit_status = ExitStatus::SUCCESS;
        env.pipe_status = vec![env.exit_status];
        return Continue(());
    }

    let saved_len = env.temp_env.len();
    let mut guard = env.begin_frame("simple command");
    guard.temp_env.extend(assignments);
    guard.protect(move |env| env.temp_env.truncate(saved_len));
    let result = invoke(&mut guard, fields);
    UnwindGuard::run(guard);
    result?;

    env.pipe_status = vec![env.exit_status];
    if !env.exit_status.is_successful() {
        run_err_trap(env)?;
        if env.options.is_on(ErrExit) && env.stack.current_trap().is_none() {
            log::debug!("errexit: exiting with {}", env.exit_status);
            return Break(Divert::ErrExit(Some(env.exit_status)));
        }
    }
    Continue(())
}

/// Searches for the utility and runs it.
fn invoke(env: &mut Env, fields: Vec<Field>) -> Result {
    let name = fields[0].value.as_str();
    let builtin = env.builtins.get(name).copied();
    if let Some(builtin) = builtin.filter(|builtin| builtin.r#type == Type::Special) {
        return run_builtin(env, builtin, fields);
    }
    if let Some(function) = env.functions.get(name).map(|entry| Rc::clone(&entry.0)) {
        return call_function(env, &function, fields);
    }
    if let Some(builtin) = builtin {
        return run_builtin(env, builtin, fields);
    }

    env.print_error_at(&fields[0].origin, &format!("{name}: command not found"));
    env.exit_status = ExitStatus::NOT_FOUND;
    Continue(())
}

fn run_builtin(env: &mut Env, builtin: Builtin, mut fields: Vec<Field>) -> Result {
    fields.remove(0);
    let result = (builtin.execute)(env, fields);
    env.exit_status = result.exit_status();
    match result.divert() {
        Some(divert) => Break(divert),
        None => Continue(()),
    }
}

/// Calls the function with the fields as arguments.
///
/// The first field is the function name and the rest become the positional
/// parameters. A `return` in the function body ends the call. The RETURN
/// trap runs after the body.
fn call_function(env: &mut Env, function: &Function, fields: Vec<Field>) -> Result {
    let params = fields.into_iter().skip(1).map(|field| field.value).collect();
    let trap_at_entry = env.traps.command(Condition::Return);
    log::trace!("calling function {}", function.name);

    let mut env = env.push_frame(Frame::Function {
        name: function.name.clone(),
    });
    let mut env = env.begin_frame("function");
    env.return_catch_depth += 1;
    env.variables.push_context(params);
    env.protect(|env| {
        env.variables.pop_context();
        env.return_catch_depth -= 1;
    });

    let source = Rc::new(Source::Function {
        name: function.name.clone(),
        origin: function.origin.clone(),
    });
    match evaluate(&mut env, &function.body, source, EvalFlags::RESET_LINE) {
        Continue(()) => (),
        Break(Divert::Return(exit_status)) => {
            if let Some(exit_status) = exit_status {
                env.exit_status = exit_status;
            }
        }
        Break(divert) => return Break(divert),
    }

    run_return_trap(&mut env, ReturnKind::Function { trap_at_entry })?;
    UnwindGuard::run(env);
    Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::env_with_builtins;
    use tsh_env::option::On;
    use tsh_env_test_helper::{assert_stderr, assert_stdout};

    fn eval(env: &mut Env, code: &str) -> Result {
        evaluate(env, code, Rc::new(Source::Unknown), EvalFlags::empty())
    }

    #[test]
    fn expanding_parameters() {
        let (mut env, system) = env_with_builtins();
        env.exit_status = ExitStatus(7);
        env.variables.assign("name".to_string(), "value".to_string());
        env.variables
            .set_positional_params(vec!["a".to_string(), "b".to_string()]);
        let result = eval(&mut env, "echo $? $# $0 $1 $2 $3 ${name} \"$name\"x '$name' $$");
        assert_eq!(result, Continue(()));
        assert_stdout(&system.state, |stdout| {
            assert_eq!(stdout, "7 2 tsh a b  value valuex $name 2\n")
        });
    }

    #[test]
    fn command_not_found() {
        let (mut env, system) = env_with_builtins();
        let result = eval(&mut env, "no_such_command");
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::NOT_FOUND);
        assert_eq!(env.pipe_status, [ExitStatus::NOT_FOUND]);
        assert_stderr(&system.state, |stderr| {
            assert_eq!(stderr, "tsh: <?>:1: no_such_command: command not found\n")
        });
    }

    #[test]
    fn assignments_without_command_are_permanent() {
        let (mut env, _system) = env_with_builtins();
        let result = eval(&mut env, "a=1 b=x");
        assert_eq!(result, Continue(()));
        assert_eq!(env.variables.get("a"), Some("1"));
        assert_eq!(env.variables.get("b"), Some("x"));
    }

    #[test]
    fn assignments_before_command_are_temporary() {
        let (mut env, system) = env_with_builtins();
        env.variables.assign("x".to_string(), "global".to_string());
        let result = eval(&mut env, "x=temp eval 'echo $x'\necho $x");
        assert_eq!(result, Continue(()));
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, "temp\nglobal\n"));
        assert!(env.temp_env.is_empty());
    }

    #[test]
    fn word_with_equal_sign_after_command_name() {
        let (mut env, system) = env_with_builtins();
        let result = eval(&mut env, "echo a=b");
        assert_eq!(result, Continue(()));
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, "a=b\n"));
    }

    #[test]
    fn function_call_with_arguments() {
        let (mut env, system) = env_with_builtins();
        let result = eval(&mut env, "f() { echo $# $1 $2; }\nf x y\necho $#");
        assert_eq!(result, Continue(()));
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, "2 x y\n0\n"));
        assert_eq!(env.variables.context_count(), 1);
        assert_eq!(env.return_catch_depth, 0);
    }

    #[test]
    fn return_from_function() {
        let (mut env, system) = env_with_builtins();
        let result = eval(&mut env, "f() { echo a; return 4; echo b; }\nf\necho $?");
        assert_eq!(result, Continue(()));
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, "a\n4\n"));
    }

    #[test]
    fn special_builtin_precedes_function() {
        let (mut env, system) = env_with_builtins();
        let result = eval(&mut env, "eval() { echo function; }\neval echo builtin");
        assert_eq!(result, Continue(()));
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, "builtin\n"));
    }

    #[test]
    fn function_precedes_regular_builtin() {
        let (mut env, system) = env_with_builtins();
        let result = eval(&mut env, "echo() { status 3; }\necho hello");
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus(3));
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, ""));
    }

    #[test]
    fn return_trap_set_inside_function() {
        let (mut env, system) = env_with_builtins();
        let system_ref = Rc::clone(&env.system);
        env.traps
            .set_trap(&*system_ref, Condition::Return, "echo outer".into(), None)
            .unwrap();
        let result = eval(&mut env, "f() { echo f; }\nf");
        assert_eq!(result, Continue(()));
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, "f\n"));
    }

    #[test]
    fn errexit_exits_on_failure() {
        let (mut env, system) = env_with_builtins();
        env.options.set(ErrExit, On);
        let result = eval(&mut env, "echo a; status 5; echo b");
        assert_eq!(result, Break(Divert::ErrExit(Some(ExitStatus(5)))));
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, "a\n"));
    }

    #[test]
    fn errexit_is_ignored_in_trap() {
        let (mut env, system) = env_with_builtins();
        env.options.set(ErrExit, On);
        let cond = Condition::Signal(tsh_env::signal::Number::SIGUSR1);
        let result = crate::trap::run_trap(&mut env, cond, "status 5; echo b".into(), None);
        assert_eq!(result, Continue(ExitStatus::SUCCESS));
        assert_stdout(&system.state, |stdout| assert_eq!(stdout, "b\n"));
    }

    #[test]
    fn unwind_frames_are_balanced_after_divert() {
        let (mut env, _system) = env_with_builtins();
        let result = eval(&mut env, "f() { g; }\ng() { x=1 exit 9; }\nf a b");
        assert_eq!(result, Break(Divert::ExitFromBuiltin(Some(ExitStatus(9)))));
        assert_eq!(env.unwind.depth(), 0);
        assert_eq!(env.unwind.opened(), env.unwind.closed());
        assert_eq!(env.stack.len(), 0);
        assert!(env.temp_env.is_empty());
        assert_eq!(env.variables.context_count(), 1);
        assert_eq!(env.return_catch_depth, 0);
    }
}
