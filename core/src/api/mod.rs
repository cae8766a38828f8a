//! Public API for the Velo expression language.
//!
//! An [`Engine`] owns the host-declared classes and the services shared by
//! every expression it compiles (conversion handlers, equality rules and
//! macros). [`Engine::compile`] produces a [`CompiledExpression`], which is
//! run against a [`VariableResolver`](crate::evaluator::VariableResolver)
//! or stepped through with a [`DebugSession`](crate::debug::DebugSession).
//!
//! # Example
//!
//! ```
//! use velo_core::api::{CompilationOptions, Engine, EngineOptions};
//! use velo_core::evaluator::MapResolver;
//! use velo_core::values::Value;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let options = EngineOptions {
//!     default_compilation_options: CompilationOptions {
//!         strong_typing: true,
//!         ..CompilationOptions::default()
//!     },
//!     ..EngineOptions::default()
//! };
//! let engine = Engine::new(&arena, options, |_types, _env| {});
//!
//! let int = engine.type_manager().int();
//! let expr = engine.compile("'n = ' + n", &[("n", int)]).unwrap();
//!
//! let mut vars = MapResolver::new().with("n", 5);
//! assert_eq!(expr.run(&mut vars).unwrap(), Value::str("n = 5"));
//! ```

pub mod engine;
pub mod environment;
pub mod error;
pub mod expression;
pub mod options;

#[cfg(test)]
mod api_test;

pub use engine::Engine;
pub use environment::EnvironmentBuilder;
pub use error::{Diagnostic, Error, RelatedInfo, Severity};
pub use expression::CompiledExpression;
pub use options::{CompilationOptions, EngineOptions, EvaluationMode, ExecutionOptions};
