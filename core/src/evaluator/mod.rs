//! Tree-walking evaluator for compiled Velo programs.
//!
//! The evaluator walks a [`Program`]'s node arena and produces runtime
//! values (`Value`).
//!
//! ## Design Principles
//!
//! - **Never panic**: operands that do not fit the kernel are reported as
//!   [`RuntimeError`]s
//! - **Stack-safe**: pending work lives on an explicit task stack, and
//!   `max_depth` bounds how deeply nested a tree may be
//! - **Resumable**: an evaluation can pause before a located node and later
//!   continue from the same point, which is how debug sessions suspend
//! - **Shareable**: evaluation only reads the arena, so one program can be
//!   evaluated from many threads with different resolvers
//!
//! ## Evaluation modes
//!
//! [`EvaluationMode::Accelerated`] dispatches binary operations on the operand
//! tags cached in each node. [`EvaluationMode::Interpreted`] is the one-shot
//! path; binary operation nodes do not provide it and report
//! [`ExecutionErrorKind::Unsupported`].
//!
//! ## Example
//!
//! ```ignore
//! let program = compiler::compile(&[("x", int)], &ctx, false)?;
//! let mut vars = MapResolver::new().with("x", 41);
//! let result = evaluator::eval(&program, &conversions, &mut vars)?;
//! assert_eq!(result, Value::Int(42));
//! ```

mod error;
mod eval;
mod operators;
mod resolver;

#[cfg(test)]
mod eval_test;

pub use error::{ExecutionError, ExecutionErrorKind, RuntimeError};
pub use eval::Evaluator;
pub(crate) use eval::Progress;
pub use operators::{do_operation, do_unary};
pub use resolver::{MapResolver, VariableResolver};

use crate::compiler::Program;
use crate::conversion::ConversionRegistry;
use crate::values::Value;

/// Limits applied to a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Maximum evaluation depth before failing with a resource error.
    pub max_depth: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self { max_depth: 1000 }
    }
}

/// How binary operation nodes are evaluated. Fixed for a whole pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvaluationMode {
    #[default]
    Accelerated,
    Interpreted,
}

/// Evaluate a program with default limits in accelerated mode.
pub fn eval<'a>(
    program: &Program<'a>,
    conversions: &ConversionRegistry,
    resolver: &mut dyn VariableResolver<'a>,
) -> Result<Value<'a>, ExecutionError> {
    eval_with_options(
        program,
        conversions,
        resolver,
        ExecutionOptions::default(),
        EvaluationMode::default(),
    )
}

/// Evaluate a program with explicit limits and mode.
pub fn eval_with_options<'a>(
    program: &Program<'a>,
    conversions: &ConversionRegistry,
    resolver: &mut dyn VariableResolver<'a>,
    options: ExecutionOptions,
    mode: EvaluationMode,
) -> Result<Value<'a>, ExecutionError> {
    Evaluator::new(&program.arena, conversions, resolver, options, mode).run(&program.statements)
}
