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

//! Items for shell variables
//!
//! A [`VariableSet`] is a stack of contexts that can be pushed and popped.
//! Each context is a map of name-value pairs. Variables in a context hide
//! those with the same name in lower contexts.
//!
//! The first context in the stack is called the _base context_, and it is
//! always present. A function call pushes a new context holding the
//! function's positional parameters and its local variables.

use std::collections::HashMap;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Context {
    variables: HashMap<String, String>,
    positional_params: Vec<String>,
}

/// Collection of variables
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariableSet {
    contexts: Vec<Context>,
}

impl Default for VariableSet {
    fn default() -> Self {
        VariableSet {
            contexts: vec![Context::default()],
        }
    }
}

impl VariableSet {
    /// Creates a variable set with an empty base context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of the visible variable with the name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.contexts
            .iter()
            .rev()
            .find_map(|context| context.variables.get(name))
            .map(String::as_str)
    }

    /// Assigns a value to the variable.
    ///
    /// The innermost existing variable with the name is updated. If there is
    /// none, the variable is created in the base context.
    pub fn assign(&mut self, name: String, value: String) {
        let context = self
            .contexts
            .iter_mut()
            .rev()
            .find(|context| context.variables.contains_key(&name));
        match context {
            Some(context) => context.variables.insert(name, value),
            None => self.contexts[0].variables.insert(name, value),
        };
    }

    /// Defines a variable in the innermost context.
    pub fn local(&mut self, name: String, value: String) {
        if let Some(context) = self.contexts.last_mut() {
            context.variables.insert(name, value);
        }
    }

    /// Pushes a new context with the positional parameters.
    pub fn push_context(&mut self, positional_params: Vec<String>) {
        self.contexts.push(Context {
            variables: HashMap::new(),
            positional_params,
        });
    }

    /// Pops the innermost context.
    ///
    /// The base context is never popped.
    pub fn pop_context(&mut self) {
        if self.contexts.len() > 1 {
            self.contexts.pop();
        }
    }

    /// Returns the visible variables sorted by name.
    #[must_use]
    pub fn visible(&self) -> Vec<(&str, &str)> {
        let mut visible = HashMap::new();
        for context in &self.contexts {
            for (name, value) in &context.variables {
                visible.insert(name.as_str(), value.as_str());
            }
        }
        let mut visible = visible.into_iter().collect::<Vec<_>>();
        visible.sort_unstable();
        visible
    }

    /// Returns the number of contexts including the base context.
    #[must_use]
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Returns the positional parameters of the innermost context.
    #[must_use]
    pub fn positional_params(&self) -> &[String] {
        match self.contexts.last() {
            Some(context) => &context.positional_params,
            None => &[],
        }
    }

    /// Replaces the positional parameters of the innermost context.
    pub fn set_positional_params(&mut self, params: Vec<String>) {
        if let Some(context) = self.contexts.last_mut() {
            context.positional_params = params;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_variables_are_sorted() {
        let mut variables = VariableSet::new();
        variables.assign("b".to_string(), "global".to_string());
        variables.assign("a".to_string(), "1".to_string());
        variables.push_context(vec![]);
        variables.local("b".to_string(), "local".to_string());
        assert_eq!(variables.visible(), [("a", "1"), ("b", "local")]);
    }

    #[test]
    fn local_variable_hides_global() {
        let mut variables = VariableSet::new();
        variables.assign("x".to_string(), "global".to_string());
        variables.push_context(vec!["a".to_string()]);
        assert_eq!(variables.get("x"), Some("global"));

        variables.local("x".to_string(), "local".to_string());
        assert_eq!(variables.get("x"), Some("local"));
        variables.assign("x".to_string(), "changed".to_string());
        assert_eq!(variables.positional_params(), ["a"]);

        variables.pop_context();
        assert_eq!(variables.get("x"), Some("global"));
        assert_eq!(variables.positional_params(), [] as [String; 0]);
    }

    #[test]
    fn assignment_in_function_without_local_is_global() {
        let mut variables = VariableSet::new();
        variables.push_context(Vec::new());
        variables.assign("y".to_string(), "1".to_string());
        variables.pop_context();
        assert_eq!(variables.get("y"), Some("1"));
    }

    #[test]
    fn base_context_is_never_popped() {
        let mut variables = VariableSet::new();
        variables.pop_context();
        assert_eq!(variables.context_count(), 1);
    }
}
