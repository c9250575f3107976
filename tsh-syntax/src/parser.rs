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

//! Syntax parser for the shell language
//!
//! The [`Parser`] reads source code line by line from an [`Input`] and
//! produces one [`Command`] per call to [`Parser::command_line`]. Lines are
//! read lazily, so a parser reading from the standard input never blocks for
//! more input than the current command needs.
//!
//! ```
//! # use tsh_syntax::input::Memory;
//! # use tsh_syntax::parser::Parser;
//! # use tsh_syntax::source::Source;
//! # use std::rc::Rc;
//! let input = Box::new(Memory::new("echo hello; echo world\n"));
//! let mut parser = Parser::new(input, Rc::new(Source::Unknown), 1);
//! let first = parser.command_line().unwrap().unwrap();
//! assert_eq!(first.to_string(), "echo hello");
//! let second = parser.command_line().unwrap().unwrap();
//! assert_eq!(second.to_string(), "echo world");
//! assert_eq!(parser.command_line().unwrap(), None);
//! ```

mod error;

pub use self::error::{Error, ErrorCause, SyntaxError};

use crate::input::Input;
use crate::source::{Location, Source};
use crate::syntax::{Command, Param, Word, WordUnit};
use std::rc::Rc;

/// Result of parsing
pub type Result<T> = std::result::Result<T, Error>;

/// Tests whether the character can start a variable name.
fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

/// Tests whether the character can appear in a variable name.
fn is_name_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Tests whether the string is a valid variable or function name.
#[must_use]
pub fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(is_name_start) && chars.all(is_name_char)
}

/// Returns the function name if the word has the form `NAME()`.
fn function_name(word: &Word) -> Option<String> {
    let literal = word.to_literal()?;
    let name = literal.strip_suffix("()")?;
    is_name(name).then(|| name.to_owned())
}

fn flush(units: &mut Vec<WordUnit>, literal: &mut String) {
    if !literal.is_empty() {
        units.push(WordUnit::Literal(std::mem::take(literal)));
    }
}

/// Line-oriented command parser
pub struct Parser {
    input: Box<dyn Input>,
    source: Rc<Source>,
    chars: Vec<char>,
    index: usize,
    line: u64,
    next_line: u64,
    eof: bool,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("source", &self.source)
            .field("line", &self.line)
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}

impl Parser {
    /// Creates a new parser.
    ///
    /// `start_line` is the line number of the first line read from the input.
    pub fn new(input: Box<dyn Input>, source: Rc<Source>, start_line: u64) -> Parser {
        Parser {
            input,
            source,
            chars: Vec::new(),
            index: 0,
            line: start_line,
            next_line: start_line,
            eof: false,
        }
    }

    /// Returns the current position.
    #[must_use]
    pub fn location(&self) -> Location {
        Location {
            source: Rc::clone(&self.source),
            line: self.line,
        }
    }

    fn error<E: Into<ErrorCause>>(&self, cause: E) -> Error {
        Error {
            cause: cause.into(),
            location: self.location(),
        }
    }

    fn fill(&mut self) -> Result<()> {
        let line = self.input.next_line().map_err(|e| self.error(e))?;
        if line.is_empty() {
            self.eof = true;
        } else {
            self.chars = line.chars().collect();
            self.index = 0;
            self.line = self.next_line;
            self.next_line += 1;
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<char>> {
        loop {
            if let Some(&c) = self.chars.get(self.index) {
                return Ok(Some(c));
            }
            if self.eof {
                return Ok(None);
            }
            self.fill()?;
        }
    }

    fn consume(&mut self) {
        self.index += 1;
    }

    fn next(&mut self) -> Result<Option<char>> {
        let c = self.peek()?;
        if c.is_some() {
            self.consume();
        }
        Ok(c)
    }

    /// Drops the rest of the current line.
    fn skip_line(&mut self) {
        self.index = self.chars.len();
    }

    fn skip_blanks(&mut self) -> Result<()> {
        while let Some(' ' | '\t') = self.peek()? {
            self.consume();
        }
        Ok(())
    }

    /// Skips a comment, leaving the terminating newline unconsumed.
    fn skip_comment(&mut self) -> Result<()> {
        while let Some(c) = self.peek()? {
            if c == '\n' {
                break;
            }
            self.consume();
        }
        Ok(())
    }

    /// Parses the next command.
    ///
    /// Returns `Ok(None)` at the end of input. After an error, the rest of
    /// the offending line is discarded so that parsing can resume with the
    /// next line.
    pub fn command_line(&mut self) -> Result<Option<Command>> {
        let result = self.command();
        if result.is_err() {
            self.skip_line();
        }
        result
    }

    fn command(&mut self) -> Result<Option<Command>> {
        loop {
            self.skip_blanks()?;
            match self.peek()? {
                None => return Ok(None),
                Some('\n') => self.consume(),
                Some('#') => self.skip_comment()?,
                Some(';') => return Err(self.error(SyntaxError::UnexpectedSemicolon)),
                Some(_) => break,
            }
        }

        let location = self.location();
        let first = self.word()?;
        if let Some(name) = function_name(&first) {
            return self.function_definition(name, location).map(Some);
        }

        let mut words = vec![first];
        loop {
            self.skip_blanks()?;
            match self.peek()? {
                None => break,
                Some('\n' | ';') => {
                    self.consume();
                    break;
                }
                Some('#') => self.skip_comment()?,
                Some(_) => words.push(self.word()?),
            }
        }
        Ok(Some(Command::Simple { words, location }))
    }

    fn function_definition(&mut self, name: String, location: Location) -> Result<Command> {
        loop {
            self.skip_blanks()?;
            match self.peek()? {
                Some('\n') => self.consume(),
                Some('{') => break,
                _ => return Err(self.error(SyntaxError::MissingFunctionBody)),
            }
        }
        let opening_location = self.location();
        self.consume();
        let body = self.brace_body(opening_location)?;

        self.skip_blanks()?;
        if let Some(';' | '\n') = self.peek()? {
            self.consume();
        }

        Ok(Command::FunctionDefinition {
            name,
            body: body.trim().into(),
            location,
        })
    }

    /// Reads raw text up to the `}` that matches an already consumed `{`.
    fn brace_body(&mut self, opening_location: Location) -> Result<String> {
        let mut body = String::new();
        let mut depth = 0_usize;
        let mut quote = None;
        loop {
            let Some(c) = self.next()? else {
                return Err(self.error(SyntaxError::UnclosedFunctionBody { opening_location }));
            };
            match (quote, c) {
                (Some('\''), '\'') | (Some('"'), '"') => quote = None,
                (Some('\''), _) => (),
                (_, '\\') => {
                    body.push(c);
                    if let Some(escaped) = self.next()? {
                        body.push(escaped);
                    }
                    continue;
                }
                (Some(_), _) => (),
                (None, '\'' | '"') => quote = Some(c),
                (None, '{') => depth += 1,
                (None, '}') if depth == 0 => return Ok(body),
                (None, '}') => depth -= 1,
                (None, _) => (),
            }
            body.push(c);
        }
    }

    fn word(&mut self) -> Result<Word> {
        let location = self.location();
        let mut units = Vec::new();
        let mut literal = String::new();
        while let Some(c) = self.peek()? {
            match c {
                ' ' | '\t' | '\n' | ';' => break,
                '\'' => {
                    let opening_location = self.location();
                    self.consume();
                    loop {
                        match self.next()? {
                            None => {
                                let cause = SyntaxError::UnclosedSingleQuote { opening_location };
                                return Err(self.error(cause));
                            }
                            Some('\'') => break,
                            Some(c) => literal.push(c),
                        }
                    }
                }
                '"' => {
                    let opening_location = self.location();
                    self.consume();
                    loop {
                        match self.next()? {
                            None => {
                                let cause = SyntaxError::UnclosedDoubleQuote { opening_location };
                                return Err(self.error(cause));
                            }
                            Some('"') => break,
                            Some('\\') => match self.next()? {
                                Some('\n') => (),
                                Some(c @ ('$' | '"' | '\\')) => literal.push(c),
                                Some(c) => {
                                    literal.push('\\');
                                    literal.push(c);
                                }
                                None => {
                                    let cause =
                                        SyntaxError::UnclosedDoubleQuote { opening_location };
                                    return Err(self.error(cause));
                                }
                            },
                            Some('$') => self.dollar(&mut units, &mut literal)?,
                            Some(c) => literal.push(c),
                        }
                    }
                }
                '\\' => {
                    self.consume();
                    match self.next()? {
                        Some('\n') => (),
                        Some(c) => literal.push(c),
                        None => literal.push('\\'),
                    }
                }
                '$' => {
                    self.consume();
                    self.dollar(&mut units, &mut literal)?;
                }
                c => {
                    self.consume();
                    literal.push(c);
                }
            }
        }
        flush(&mut units, &mut literal);
        Ok(Word { units, location })
    }

    /// Parses what follows a `$` that has been consumed.
    fn dollar(&mut self, units: &mut Vec<WordUnit>, literal: &mut String) -> Result<()> {
        match self.param()? {
            Some(param) => {
                flush(units, literal);
                units.push(WordUnit::Param(param));
            }
            None => literal.push('$'),
        }
        Ok(())
    }

    fn param(&mut self) -> Result<Option<Param>> {
        let Some(c) = self.peek()? else {
            return Ok(None);
        };
        let param = match c {
            '?' => Param::ExitStatus,
            '#' => Param::Count,
            '$' => Param::ProcessId,
            '{' => {
                let opening_location = self.location();
                self.consume();
                return self.braced_param(opening_location).map(Some);
            }
            c if c.is_ascii_digit() => Param::Positional(c as usize - '0' as usize),
            c if is_name_start(c) => {
                let mut name = String::new();
                while let Some(c) = self.peek()? {
                    if !is_name_char(c) {
                        break;
                    }
                    self.consume();
                    name.push(c);
                }
                return Ok(Some(Param::Variable(name)));
            }
            _ => return Ok(None),
        };
        self.consume();
        Ok(Some(param))
    }

    fn braced_param(&mut self, opening_location: Location) -> Result<Param> {
        let mut name = String::new();
        loop {
            match self.next()? {
                None => {
                    let cause = SyntaxError::UnclosedParam { opening_location };
                    return Err(self.error(cause));
                }
                Some('}') => break,
                Some(c) if is_name_char(c) => name.push(c),
                Some(_) => return Err(self.error(SyntaxError::InvalidParam)),
            }
        }
        if name.is_empty() {
            return Err(self.error(SyntaxError::EmptyParam));
        }
        if let Ok(index) = name.parse() {
            return Ok(Param::Positional(index));
        }
        if !is_name(&name) {
            return Err(self.error(SyntaxError::InvalidParam));
        }
        Ok(Param::Variable(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Memory;
    use assert_matches::assert_matches;

    fn parser(code: &str) -> Parser {
        Parser::new(Box::new(Memory::new(code)), Rc::new(Source::Unknown), 1)
    }

    fn literal_words(command: &Command) -> Vec<String> {
        let Command::Simple { words, .. } = command else {
            panic!("not a simple command: {command:?}");
        };
        words.iter().map(|w| w.to_literal().unwrap()).collect()
    }

    #[test]
    fn empty_input() {
        assert_eq!(parser("").command_line(), Ok(None));
        assert_eq!(parser("\n\n  # comment\n").command_line(), Ok(None));
    }

    #[test]
    fn simple_commands_separated_by_semicolons_and_newlines() {
        let mut parser = parser("echo a b; echo c\n\necho d # comment\n");

        let command = parser.command_line().unwrap().unwrap();
        assert_eq!(literal_words(&command), ["echo", "a", "b"]);
        assert_eq!(command.location().line, 1);

        let command = parser.command_line().unwrap().unwrap();
        assert_eq!(literal_words(&command), ["echo", "c"]);

        let command = parser.command_line().unwrap().unwrap();
        assert_eq!(literal_words(&command), ["echo", "d"]);
        assert_eq!(command.location().line, 3);

        assert_eq!(parser.command_line(), Ok(None));
    }

    #[test]
    fn quotes_and_escapes() {
        let mut parser = parser(r#"echo 'a  b' "c;d" e\ f "\$x\q" ''"#);
        let command = parser.command_line().unwrap().unwrap();
        assert_eq!(
            literal_words(&command),
            ["echo", "a  b", "c;d", "e f", "$x\\q", ""]
        );
    }

    #[test]
    fn single_quote_spanning_lines() {
        let mut parser = parser("echo 'a\nb'\necho c\n");
        let command = parser.command_line().unwrap().unwrap();
        assert_eq!(literal_words(&command), ["echo", "a\nb"]);
        let command = parser.command_line().unwrap().unwrap();
        assert_eq!(literal_words(&command), ["echo", "c"]);
        assert_eq!(command.location().line, 3);
    }

    #[test]
    fn parameters() {
        let mut parser = parser(r#"echo $? $# $$ $1 $FOO "${bar}x" $ ${12}"#);
        let Some(Command::Simple { words, .. }) = parser.command_line().unwrap() else {
            panic!("expected a simple command");
        };
        assert_eq!(words[1].units, [WordUnit::Param(Param::ExitStatus)]);
        assert_eq!(words[2].units, [WordUnit::Param(Param::Count)]);
        assert_eq!(words[3].units, [WordUnit::Param(Param::ProcessId)]);
        assert_eq!(words[4].units, [WordUnit::Param(Param::Positional(1))]);
        assert_eq!(
            words[5].units,
            [WordUnit::Param(Param::Variable("FOO".to_string()))]
        );
        assert_eq!(
            words[6].units,
            [
                WordUnit::Param(Param::Variable("bar".to_string())),
                WordUnit::Literal("x".to_string()),
            ]
        );
        assert_eq!(words[7].units, [WordUnit::Literal("$".to_string())]);
        assert_eq!(words[8].units, [WordUnit::Param(Param::Positional(12))]);
    }

    #[test]
    fn function_definition_on_one_line() {
        let mut parser = parser("f() { echo \"}\"; g() { :; }; }; echo after\n");
        let command = parser.command_line().unwrap().unwrap();
        assert_matches!(command, Command::FunctionDefinition { name, body, .. } => {
            assert_eq!(name, "f");
            assert_eq!(&*body, "echo \"}\"; g() { :; };");
        });
        let command = parser.command_line().unwrap().unwrap();
        assert_eq!(literal_words(&command), ["echo", "after"]);
    }

    #[test]
    fn function_definition_on_multiple_lines() {
        let mut parser = parser("f()\n{\n  echo one\n  echo two\n}\n");
        let command = parser.command_line().unwrap().unwrap();
        assert_matches!(command, Command::FunctionDefinition { name, body, location } => {
            assert_eq!(name, "f");
            assert_eq!(&*body, "echo one\n  echo two");
            assert_eq!(location.line, 1);
        });
        assert_eq!(parser.command_line(), Ok(None));
    }

    #[test]
    fn unclosed_quotes() {
        let e = parser("echo 'foo").command_line().unwrap_err();
        assert_matches!(
            e.cause,
            ErrorCause::Syntax(SyntaxError::UnclosedSingleQuote { .. })
        );

        let e = parser("echo \"foo").command_line().unwrap_err();
        assert_matches!(
            e.cause,
            ErrorCause::Syntax(SyntaxError::UnclosedDoubleQuote { .. })
        );
    }

    #[test]
    fn braced_parameter_errors() {
        let e = parser("echo ${").command_line().unwrap_err();
        assert_matches!(e.cause, ErrorCause::Syntax(SyntaxError::UnclosedParam { .. }));

        let e = parser("echo ${}").command_line().unwrap_err();
        assert_eq!(e.cause, SyntaxError::EmptyParam.into());

        let e = parser("echo ${a-b}").command_line().unwrap_err();
        assert_eq!(e.cause, SyntaxError::InvalidParam.into());

        let e = parser("echo ${1a}").command_line().unwrap_err();
        assert_eq!(e.cause, SyntaxError::InvalidParam.into());
    }

    #[test]
    fn function_body_errors() {
        let e = parser("f() echo").command_line().unwrap_err();
        assert_eq!(e.cause, SyntaxError::MissingFunctionBody.into());

        let e = parser("f() { echo").command_line().unwrap_err();
        assert_matches!(
            e.cause,
            ErrorCause::Syntax(SyntaxError::UnclosedFunctionBody { .. })
        );
    }

    #[test]
    fn parsing_resumes_on_next_line_after_error() {
        let mut parser = parser("; echo skipped\necho next\n");
        let e = parser.command_line().unwrap_err();
        assert_eq!(e.cause, SyntaxError::UnexpectedSemicolon.into());
        assert_eq!(e.location.line, 1);

        let command = parser.command_line().unwrap().unwrap();
        assert_eq!(literal_words(&command), ["echo", "next"]);
    }

    #[test]
    fn start_line_number() {
        let input = Box::new(Memory::new("\necho\n"));
        let mut parser = Parser::new(input, Rc::new(Source::Unknown), 10);
        let command = parser.command_line().unwrap().unwrap();
        assert_eq!(command.location().line, 11);
    }

    #[test]
    fn is_name_examples() {
        assert!(is_name("foo"));
        assert!(is_name("_1"));
        assert!(!is_name("1a"));
        assert!(!is_name(""));
        assert!(!is_name("a-b"));
    }
}
