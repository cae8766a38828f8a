//! Compiled Velo expressions.

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use super::{Error, ExecutionOptions};
use crate::compiler::Program;
use crate::conversion::ConversionRegistry;
use crate::debug::{BreakpointRegistry, DebugSession, Debugger};
use crate::evaluator::{
    EvaluationMode, ExecutionError, Evaluator, MapResolver, VariableResolver,
};
use crate::types::Type;
use crate::values::Value;

/// A compiled Velo expression ready for execution.
///
/// A compiled expression owns its node tree and shares the engine's
/// conversion registry. Evaluation never mutates it, so one expression can
/// be run any number of times and from several threads at once, each run
/// with its own [`VariableResolver`].
///
/// # Example
///
/// ```ignore
/// let expr = engine.compile("x * 2", &[("x", int)])?;
///
/// let mut vars = MapResolver::new().with("x", 21);
/// assert_eq!(expr.run(&mut vars)?, Value::Int(42));
///
/// // Or with a list of arguments, checked against the declared inputs
/// assert_eq!(expr.run_with_args(&[("x", Value::Int(4))])?, Value::Int(8));
/// ```
pub struct CompiledExpression<'arena> {
    program: Program<'arena>,

    /// Declared inputs, for argument validation
    inputs: Vec<(String, Type<'arena>)>,

    conversions: Arc<ConversionRegistry>,

    /// Source text after macro expansion
    source: String,

    mode: EvaluationMode,
    options: ExecutionOptions,
}

impl<'arena> CompiledExpression<'arena> {
    /// Create a new compiled expression.
    ///
    /// This is called internally by Engine::compile_with().
    pub(crate) fn new(
        program: Program<'arena>,
        inputs: Vec<(String, Type<'arena>)>,
        conversions: Arc<ConversionRegistry>,
        source: String,
        mode: EvaluationMode,
        options: ExecutionOptions,
    ) -> Self {
        Self {
            program,
            inputs,
            conversions,
            source,
            mode,
            options,
        }
    }

    /// Static type of the expression's value.
    pub fn return_type(&self) -> Type<'arena> {
        self.program.return_type
    }

    /// Declared inputs as (name, type) pairs.
    pub fn inputs(&self) -> impl Iterator<Item = (&str, Type<'arena>)> {
        self.inputs.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Source text the expression was compiled from, after macro expansion.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn program(&self) -> &Program<'arena> {
        &self.program
    }

    /// Execute with the engine's default execution options.
    pub fn run(&self, resolver: &mut dyn VariableResolver<'arena>) -> Result<Value<'arena>, Error> {
        self.run_with_options(self.options, resolver)
    }

    /// Execute with explicit execution options.
    pub fn run_with_options(
        &self,
        options: ExecutionOptions,
        resolver: &mut dyn VariableResolver<'arena>,
    ) -> Result<Value<'arena>, Error> {
        Evaluator::new(
            &self.program.arena,
            &self.conversions,
            resolver,
            options,
            self.mode,
        )
        .run(&self.program.statements)
        .map_err(|err| self.error(err))
    }

    /// Execute with named arguments.
    ///
    /// Every argument must name a declared input. Inputs without an argument
    /// stay unbound and fail only if evaluation reaches them.
    pub fn run_with_args(&self, args: &[(&str, Value<'arena>)]) -> Result<Value<'arena>, Error> {
        for (name, _) in args {
            if !self.inputs.iter().any(|(input, _)| input == name) {
                return Err(Error::Api(format!("Unknown input '{}'", name)));
            }
        }
        let mut resolver: MapResolver<'arena> =
            args.iter().map(|(name, value)| (*name, value.clone())).collect();
        self.run(&mut resolver)
    }

    /// Start a debug session over this expression.
    ///
    /// Breakpoints only match expressions compiled with debug symbols. Errors
    /// reported by the session can be turned into public errors with
    /// [`CompiledExpression::error`].
    pub fn debug<'s>(
        &'s self,
        resolver: &'s mut dyn VariableResolver<'arena>,
        breakpoints: &'s BreakpointRegistry,
    ) -> DebugSession<'s, 'arena> {
        let evaluator = Evaluator::new(
            &self.program.arena,
            &self.conversions,
            resolver,
            self.options,
            self.mode,
        );
        DebugSession::new(
            evaluator,
            &self.program.arena,
            &self.program.statements,
            breakpoints,
        )
    }

    /// Execute, handing every suspension to `debugger`.
    pub fn run_with_debugger(
        &self,
        resolver: &mut dyn VariableResolver<'arena>,
        breakpoints: &BreakpointRegistry,
        debugger: &mut dyn Debugger<'arena>,
    ) -> Result<Value<'arena>, Error> {
        self.debug(resolver, breakpoints)
            .run_to_completion(debugger)
            .map_err(|err| self.error(err))
    }

    /// Convert an evaluation error of this expression into a public error.
    pub fn error(&self, err: ExecutionError) -> Error {
        tracing::debug!(error = %err, "evaluation failed");
        Error::execution(err, &self.source)
    }
}
