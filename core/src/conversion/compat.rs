use alloc::string::{String, ToString};

use hashbrown::HashSet;

use crate::types::Type;

/// Decides whether two otherwise incompatible types may still be compared
/// with `==` and `!=`.
pub trait EqualityCompatibility: Send + Sync {
    fn are_equality_compatible(&self, left: &Type<'_>, right: &Type<'_>) -> bool;
}

/// Accepts nothing. This is the engine default.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectAll;

impl EqualityCompatibility for RejectAll {
    fn are_equality_compatible(&self, _left: &Type<'_>, _right: &Type<'_>) -> bool {
        false
    }
}

/// Accepts explicitly allowed pairs of type names, in either order.
#[derive(Debug, Default, Clone)]
pub struct ClassPairs {
    pairs: HashSet<(String, String)>,
}

impl ClassPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(&mut self, left: &str, right: &str) -> &mut Self {
        self.pairs.insert((left.to_string(), right.to_string()));
        self.pairs.insert((right.to_string(), left.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl EqualityCompatibility for ClassPairs {
    fn are_equality_compatible(&self, left: &Type<'_>, right: &Type<'_>) -> bool {
        self.pairs
            .contains(&(left.to_string(), right.to_string()))
    }
}
