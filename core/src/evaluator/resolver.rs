use alloc::string::{String, ToString};

use hashbrown::HashMap;

use crate::values::Value;

/// Supplies variable bindings to an evaluation and receives assignments.
///
/// Each evaluation borrows its resolver mutably, so threads sharing one
/// compiled expression each bring their own.
pub trait VariableResolver<'a> {
    fn resolve(&self, name: &str) -> Option<Value<'a>>;

    fn assign(&mut self, name: &str, value: Value<'a>);
}

/// A [`VariableResolver`] backed by a hash map.
#[derive(Debug, Clone, Default)]
pub struct MapResolver<'a> {
    variables: HashMap<String, Value<'a>>,
}

impl<'a> MapResolver<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style binding.
    pub fn with(mut self, name: &str, value: impl Into<Value<'a>>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value<'a>>) {
        self.variables.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value<'a>> {
        self.variables.get(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl<'a> VariableResolver<'a> for MapResolver<'a> {
    fn resolve(&self, name: &str) -> Option<Value<'a>> {
        self.variables.get(name).cloned()
    }

    fn assign(&mut self, name: &str, value: Value<'a>) {
        self.insert(name, value);
    }
}

impl<'a, S: AsRef<str>> FromIterator<(S, Value<'a>)> for MapResolver<'a> {
    fn from_iter<I: IntoIterator<Item = (S, Value<'a>)>>(iter: I) -> Self {
        Self {
            variables: iter
                .into_iter()
                .map(|(name, value)| (name.as_ref().to_string(), value))
                .collect(),
        }
    }
}
