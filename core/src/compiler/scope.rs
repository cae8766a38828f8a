use alloc::string::{String, ToString};

use hashbrown::HashMap;

use crate::types::Type;

/// Names visible to the statements being compiled: declared inputs plus
/// locals assigned by earlier statements.
#[derive(Debug, Default)]
pub struct Scope<'a> {
    names: HashMap<String, Type<'a>>,
}

impl<'a> Scope<'a> {
    pub fn new(inputs: &[(&str, Type<'a>)]) -> Self {
        let mut scope = Self::default();
        for (name, ty) in inputs {
            scope.declare(name, *ty);
        }
        scope
    }

    /// Declare `name`, replacing any earlier declaration.
    pub fn declare(&mut self, name: &str, ty: Type<'a>) {
        self.names.insert(name.to_string(), ty);
    }

    pub fn lookup(&self, name: &str) -> Option<Type<'a>> {
        self.names.get(name).copied()
    }
}
