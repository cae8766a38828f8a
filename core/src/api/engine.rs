//! The Velo compilation engine.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;

use super::environment::Environment;
use super::{CompilationOptions, CompiledExpression, EngineOptions, EnvironmentBuilder, Error};
use crate::ast::BuildContext;
use crate::compiler;
use crate::conversion::{ConversionRegistry, EqualityCompatibility};
use crate::macros::MacroProcessor;
use crate::types::{Type, manager::TypeManager};
use bumpalo::Bump;

/// The Velo compilation engine.
///
/// The engine manages:
/// - Type system (TypeManager), including declared host classes
/// - Shared services (conversion handlers, equality rules, macros)
/// - Default options for compilation and execution
///
/// # Lifetimes
///
/// - `'arena`: Lifetime of the arena holding class declarations. Compiled
///   expressions may refer to these classes.
///
/// # Example
///
/// ```
/// use velo_core::api::{Engine, EngineOptions};
/// use velo_core::evaluator::MapResolver;
/// use velo_core::values::Value;
/// use bumpalo::Bump;
///
/// let arena = Bump::new();
/// let engine = Engine::new(&arena, EngineOptions::default(), |_types, env| {
///     env.define_macro("answer", "42");
/// });
///
/// let int = engine.type_manager().int();
/// let expr = engine.compile("answer - x", &[("x", int)]).unwrap();
/// let mut vars = MapResolver::new().with("x", 2);
/// assert_eq!(expr.run(&mut vars).unwrap(), Value::Int(40));
/// ```
pub struct Engine<'arena> {
    type_manager: &'arena TypeManager<'arena>,
    conversions: Arc<ConversionRegistry>,
    equality: Box<dyn EqualityCompatibility>,
    macros: MacroProcessor,
    options: EngineOptions,
}

impl<'arena> Engine<'arena> {
    /// Create a new engine with a custom environment.
    ///
    /// The initialization closure receives:
    /// - `type_mgr`: The type manager, for declaring host classes
    /// - `env`: The environment builder for registering services
    pub fn new(
        arena: &'arena Bump,
        options: EngineOptions,
        init: impl FnOnce(&'arena TypeManager<'arena>, &mut EnvironmentBuilder),
    ) -> Self {
        let type_manager = TypeManager::new(arena);

        let mut env_builder = EnvironmentBuilder::new();
        init(type_manager, &mut env_builder);
        let Environment {
            conversions,
            equality,
            macros,
        } = env_builder.build();

        Self {
            type_manager,
            conversions: Arc::new(conversions),
            equality,
            macros,
            options,
        }
    }

    /// Access the type manager.
    ///
    /// Useful for building input declarations.
    pub fn type_manager(&self) -> &'arena TypeManager<'arena> {
        self.type_manager
    }

    /// Access the conversion registry shared by compiled expressions.
    pub fn conversions(&self) -> &ConversionRegistry {
        &self.conversions
    }

    /// Access the engine options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Expand registered macros in `source`.
    pub fn expand_macros(&self, source: &str) -> String {
        self.macros.parse(source)
    }

    /// Compile an expression with the engine's default compilation options.
    ///
    /// # Parameters
    ///
    /// - `source`: The source code of the expression
    /// - `inputs`: Declared inputs as (name, type) pairs
    pub fn compile(
        &self,
        source: &str,
        inputs: &[(&str, Type<'arena>)],
    ) -> Result<CompiledExpression<'arena>, Error> {
        self.compile_with(&self.options.default_compilation_options, source, inputs)
    }

    /// Compile an expression with explicit compilation options.
    ///
    /// Macros are expanded first; diagnostics refer to the expanded text,
    /// which the returned error carries.
    pub fn compile_with(
        &self,
        options: &CompilationOptions,
        source: &str,
        inputs: &[(&str, Type<'arena>)],
    ) -> Result<CompiledExpression<'arena>, Error> {
        let expanded = self.macros.parse(source);
        let ctx = BuildContext {
            strong_typing: options.strong_typing,
            conversions: &self.conversions,
            equality: &*self.equality,
            source: &expanded,
            source_file: options.source_file.as_deref(),
        };

        let program =
            compiler::compile_with_max_depth(inputs, &ctx, options.debug_symbols, options.max_depth)
                .map_err(|err| {
                    tracing::debug!(error = %err, "compilation failed");
                    Error::compilation(err, &expanded)
                })?;

        Ok(CompiledExpression::new(
            program,
            inputs
                .iter()
                .map(|(name, ty)| (name.to_string(), *ty))
                .collect(),
            Arc::clone(&self.conversions),
            expanded,
            options.mode,
            self.options.default_execution_options,
        ))
    }
}
