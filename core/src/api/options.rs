//! Configuration options for the Velo engine.

use alloc::string::String;

pub use crate::evaluator::{EvaluationMode, ExecutionOptions};

/// Configuration options for compilation.
///
/// # Example
///
/// ```
/// use velo_core::api::CompilationOptions;
///
/// let options = CompilationOptions {
///     strong_typing: true,
///     debug_symbols: true,
///     source_file: Some("rules.mv".to_string()),
///     ..CompilationOptions::default()
/// };
/// assert!(options.strong_typing);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationOptions {
    /// Reject operand combinations that are not statically compatible.
    ///
    /// Without strong typing, operands of unknown type are checked when the
    /// expression runs.
    ///
    /// Default: false
    pub strong_typing: bool,

    /// Attach source locations to statement roots and to nodes that start a
    /// new line so that breakpoints can match them.
    ///
    /// Default: false
    pub debug_symbols: bool,

    /// Source name recorded in statement locations.
    ///
    /// Default: None (reported as `<unknown>`)
    pub source_file: Option<String>,

    /// How binary operations are evaluated when the expression runs.
    ///
    /// Default: [`EvaluationMode::Accelerated`]
    pub mode: EvaluationMode,

    /// Deepest parenthesis nesting accepted. Deeper sources fail with a
    /// `P004` diagnostic.
    ///
    /// Default: 128
    pub max_depth: usize,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            strong_typing: false,
            debug_symbols: false,
            source_file: None,
            mode: EvaluationMode::default(),
            max_depth: crate::parser::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Configuration options for the Engine.
///
/// # Example
///
/// ```
/// use velo_core::api::{EngineOptions, ExecutionOptions};
///
/// let options = EngineOptions {
///     default_execution_options: ExecutionOptions { max_depth: 200 },
///     ..EngineOptions::default()
/// };
/// assert_eq!(options.default_execution_options.max_depth, 200);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Options used by [`Engine::compile`](crate::api::Engine::compile).
    pub default_compilation_options: CompilationOptions,

    /// Options used by [`CompiledExpression::run`](crate::api::CompiledExpression::run).
    pub default_execution_options: ExecutionOptions,
}
