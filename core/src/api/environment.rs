//! Environment builder for host-provided services.

use alloc::boxed::Box;
use alloc::string::ToString;

use crate::conversion::{
    ClassPairs, ConversionHandler, ConversionRegistry, EqualityCompatibility,
};
use crate::macros::{Macro, MacroProcessor};
use crate::types::Type;

/// Builder for the services every expression compiled by an engine shares:
/// conversion handlers for host classes, equality rules and macros.
///
/// # Example
///
/// ```
/// use velo_core::api::{Engine, EngineOptions};
/// use bumpalo::Bump;
///
/// let arena = Bump::new();
/// let engine = Engine::new(&arena, EngineOptions::default(), |types, env| {
///     let date = types.declare_class("Date", None);
///     env.allow_equality(&date, &types.str());
///     env.define_macro("today", "'2024-01-01'");
/// });
/// assert!(engine.compile("today == 'x'", &[]).is_ok());
/// ```
#[derive(Default)]
pub struct EnvironmentBuilder {
    conversions: ConversionRegistry,
    equality_pairs: ClassPairs,
    equality: Option<Box<dyn EqualityCompatibility>>,
    macros: MacroProcessor,
}

/// Services assembled by [`EnvironmentBuilder::build`].
pub(crate) struct Environment {
    pub conversions: ConversionRegistry,
    pub equality: Box<dyn EqualityCompatibility>,
    pub macros: MacroProcessor,
}

impl EnvironmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler used for conversions into the class `class_name`.
    pub fn register_conversion(
        &mut self,
        class_name: &str,
        handler: impl ConversionHandler + 'static,
    ) -> &mut Self {
        self.conversions.register(class_name, handler);
        self
    }

    /// Allow `==` and `!=` between two types that are otherwise incompatible.
    /// The rule applies in both operand orders.
    pub fn allow_equality(&mut self, left: &Type<'_>, right: &Type<'_>) -> &mut Self {
        tracing::debug!(%left, %right, "allow equality");
        self.equality_pairs
            .allow(&left.to_string(), &right.to_string());
        self
    }

    /// Replace the pairwise equality rules with a custom strategy.
    pub fn equality_strategy(
        &mut self,
        strategy: impl EqualityCompatibility + 'static,
    ) -> &mut Self {
        self.equality = Some(Box::new(strategy));
        self
    }

    /// Register a macro expanded in source text before parsing.
    pub fn register_macro(&mut self, name: &str, expansion: impl Macro + 'static) -> &mut Self {
        self.macros.register(name, expansion);
        self
    }

    /// Register a macro that always expands to `text`.
    pub fn define_macro(&mut self, name: &str, text: &str) -> &mut Self {
        self.macros.define(name, text);
        self
    }

    pub(crate) fn build(self) -> Environment {
        let equality = match self.equality {
            Some(strategy) => strategy,
            None => Box::new(self.equality_pairs),
        };
        Environment {
            conversions: self.conversions,
            equality,
            macros: self.macros,
        }
    }
}
