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

//! Type definitions for functions.
//!
//! This module provides data types for defining shell functions.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;
use std::hash::Hasher;
use std::rc::Rc;
use tsh_syntax::source::Location;

/// Definition of a function.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Function {
    /// String that identifies the function.
    pub name: String,

    /// Source code of the function body, without the enclosing braces.
    ///
    /// The body is parsed each time the function is called.
    pub body: Rc<str>,

    /// Location of the function definition command that defined this function.
    pub origin: Location,
}

/// Wrapper of [`Function`] for inserting into a hash set.
///
/// A `HashEntry` wraps a `Function` in `Rc` so that the function can be
/// referred to even after the function has been removed or redefined while it
/// is running. The `Hash` and `PartialEq` implementation for `HashEntry` only
/// compares names.
#[derive(Clone, Debug, Eq)]
pub struct HashEntry(pub Rc<Function>);

impl HashEntry {
    /// Convenience method for creating a new function as a `HashEntry`.
    pub fn new(name: String, body: Rc<str>, origin: Location) -> HashEntry {
        HashEntry(Rc::new(Function { name, body, origin }))
    }
}

impl PartialEq for HashEntry {
    /// Compares the names of two hash entries.
    fn eq(&self, other: &HashEntry) -> bool {
        self.0.name == other.0.name
    }
}

impl Hash for HashEntry {
    /// Hashes the name of the function.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state)
    }
}

impl Borrow<str> for HashEntry {
    fn borrow(&self) -> &str {
        &self.0.name
    }
}

/// Collection of functions.
pub type FunctionSet = HashSet<HashEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redefinition_replaces_entry() {
        let mut functions = FunctionSet::new();
        functions.insert(HashEntry::new("f".to_string(), "echo 1".into(), Location::dummy()));
        let old = functions.get("f").map(|entry| Rc::clone(&entry.0));
        functions.replace(HashEntry::new("f".to_string(), "echo 2".into(), Location::dummy()));

        assert_eq!(functions.len(), 1);
        assert_eq!(&*functions.get("f").unwrap().0.body, "echo 2");
        assert_eq!(&*old.unwrap().body, "echo 1");
    }
}
