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

//! Splitting the input into fields and assigning them to variables
//!
//! The field separators are the characters of `$IFS`, which defaults to
//! space, tab and newline when unset. Separators quoted by a backslash are
//! ordinary characters. A run of whitespace separators, optionally around
//! one non-whitespace separator, delimits a field. Leading and trailing
//! whitespace separators are removed.

use super::input::QuotedChar;
use tsh_env::Env;
use tsh_env::semantics::Field;

const DEFAULT_IFS: &str = " \t\n";

struct Separators<'a> {
    ifs: &'a str,
}

impl Separators<'_> {
    fn is_separator(&self, c: &QuotedChar) -> bool {
        !c.is_quoted && self.ifs.contains(c.value)
    }

    fn is_whitespace(&self, c: &QuotedChar) -> bool {
        self.is_separator(c) && c.value.is_whitespace()
    }

    fn skip_whitespace(&self, chars: &[QuotedChar], mut i: usize) -> usize {
        while chars.get(i).is_some_and(|c| self.is_whitespace(c)) {
            i += 1;
        }
        i
    }

    /// Skips a field delimiter starting at `i`.
    fn skip_delimiter(&self, chars: &[QuotedChar], i: usize) -> usize {
        let mut i = self.skip_whitespace(chars, i);
        if chars
            .get(i)
            .is_some_and(|c| self.is_separator(c) && !self.is_whitespace(c))
        {
            i = self.skip_whitespace(chars, i + 1);
        }
        i
    }
}

fn collect(chars: &[QuotedChar]) -> String {
    chars.iter().map(|c| c.value).collect()
}

/// Splits the characters into at most `count` fields.
///
/// The last field contains the rest of the input with only the trailing
/// whitespace separators removed.
fn split(chars: &[QuotedChar], ifs: &str, count: usize) -> Vec<String> {
    let separators = Separators { ifs };
    let mut fields = Vec::with_capacity(count);
    let mut i = separators.skip_whitespace(chars, 0);

    while fields.len() + 1 < count && i < chars.len() {
        let start = i;
        while chars.get(i).is_some_and(|c| !separators.is_separator(c)) {
            i += 1;
        }
        fields.push(collect(&chars[start..i]));
        i = separators.skip_delimiter(chars, i);
    }

    let mut end = chars.len();
    while end > i && separators.is_whitespace(&chars[end - 1]) {
        end -= 1;
    }
    fields.push(collect(&chars[i.min(end)..end]));
    fields.resize(count, String::new());
    fields
}

/// Assigns the input to the variables.
///
/// Variables that receive no field are set to the empty string.
pub fn assign(env: &mut Env, chars: &[QuotedChar], variables: Vec<Field>, last_variable: Field) {
    let ifs = env.lookup("IFS").unwrap_or(DEFAULT_IFS).to_owned();
    let names = variables.into_iter().chain(std::iter::once(last_variable));
    let count = names.size_hint().0;
    let values = split(chars, &ifs, count);
    for (name, value) in names.zip(values) {
        log::trace!("read: {}={value:?}", name.value);
        env.variables.assign(name.value, value);
    }
}
