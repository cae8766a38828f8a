//! Velo - an embeddable expression language with a typed node tree
//!
//! # Overview
//!
//! Velo compiles short scripts (`'n = ' + n`, `price * qty > limit`) into a
//! tree of nodes whose operand types are resolved at compile time. Compiled
//! expressions are immutable and can be evaluated many times, from many
//! threads, against caller-provided variables.
//!
//! - Strong typing rejects incompatible operands at compile time and converts
//!   literals to the type of the other operand.
//! - Loose typing defers checks to run time, coercing strings that read as
//!   numbers.
//! - Host applications declare their own classes, conversions into them and
//!   which of them may be compared for equality.
//! - Statements compiled with debug symbols can be stepped through with
//!   breakpoints shared across threads.
//!
//! # Quick Start
//!
//! ```
//! use velo::{Engine, EngineOptions, MapResolver, Value};
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let engine = Engine::new(&arena, EngineOptions::default(), |_types, env| {
//!     env.define_macro("limit", "100");
//! });
//!
//! let int = engine.type_manager().int();
//! let expr = engine
//!     .compile("price * qty > limit", &[("price", int), ("qty", int)])
//!     .unwrap();
//!
//! let mut vars = MapResolver::new().with("price", 30).with("qty", 4);
//! assert_eq!(expr.run(&mut vars).unwrap(), Value::Boolean(true));
//! ```
//!
//! # Errors
//!
//! Compilation and runtime errors carry diagnostics with spans into the
//! (macro-expanded) source. [`render_error_to_string`] formats them with
//! source snippets.

pub use velo_core::api::{
    CompilationOptions, CompiledExpression, Diagnostic, Engine, EngineOptions, EnvironmentBuilder,
    Error, EvaluationMode, ExecutionOptions, RelatedInfo, Severity,
};

pub use velo_core::conversion::{
    ClassPairs, ConversionError, ConversionHandler, ConversionRegistry, EqualityCompatibility,
};
pub use velo_core::debug::{
    BreakpointRegistry, DebugSession, DebugStep, Debugger, Directive, Frame,
};
pub use velo_core::evaluator::{MapResolver, VariableResolver};
pub use velo_core::macros::{Macro, parse_macros};
pub use velo_core::types::{self, Primitive, Type, TypeTag, manager::TypeManager};
pub use velo_core::values::{self, HostValue, Value};

mod error_renderer;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
