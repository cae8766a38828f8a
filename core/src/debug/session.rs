//! Breakpoint-aware evaluation of a program.

use alloc::string::String;

use crate::ast::{NodeArena, NodeId};
use crate::debug::BreakpointRegistry;
use crate::evaluator::{ExecutionError, Evaluator, Progress, VariableResolver};
use crate::parser::SourceLocation;
use crate::values::Value;

/// How a suspended session resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Run until the next registered breakpoint, or to completion.
    Continue,
    /// Suspend again before the next node that carries a location.
    Step,
}

/// What a debugger sees while evaluation is suspended.
pub struct Frame<'f, 'a> {
    pub source_name: &'f str,
    pub line: u32,
    variables: &'f dyn VariableResolver<'a>,
}

impl<'a> Frame<'_, 'a> {
    pub fn variable(&self, name: &str) -> Option<Value<'a>> {
        self.variables.resolve(name)
    }

    pub fn variables(&self) -> &dyn VariableResolver<'a> {
        self.variables
    }
}

/// Callback invoked each time a session suspends.
pub trait Debugger<'a> {
    fn on_break(&mut self, frame: &Frame<'_, 'a>) -> Directive;
}

/// Outcome of driving a [`DebugSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum DebugStep<'a> {
    Completed(Value<'a>),
    Suspended { source_name: String, line: u32 },
}

/// Resumable evaluation of a statement list.
///
/// Before any node that carries a source location is evaluated, the session
/// consults the registry. A match suspends the session and hands control
/// back to the caller, which resumes it with a [`Directive`]. A suspension
/// inside a statement keeps the partial evaluation, so resuming continues
/// exactly where it stopped.
pub struct DebugSession<'r, 'a> {
    evaluator: Evaluator<'r, 'a>,
    arena: &'r NodeArena<'a>,
    statements: &'r [NodeId],
    registry: &'r BreakpointRegistry,
    next: usize,
    in_statement: bool,
    last: Value<'a>,
    stepping: bool,
    suspended_at: Option<NodeId>,
}

impl<'r, 'a> DebugSession<'r, 'a> {
    pub fn new(
        evaluator: Evaluator<'r, 'a>,
        arena: &'r NodeArena<'a>,
        statements: &'r [NodeId],
        registry: &'r BreakpointRegistry,
    ) -> Self {
        Self {
            evaluator,
            arena,
            statements,
            registry,
            next: 0,
            in_statement: false,
            last: Value::Null,
            stepping: false,
            suspended_at: None,
        }
    }

    /// Run until the first breakpoint or to completion.
    pub fn start(&mut self) -> Result<DebugStep<'a>, ExecutionError> {
        self.stepping = false;
        self.advance()
    }

    /// Resume a suspended session.
    pub fn resume(&mut self, directive: Directive) -> Result<DebugStep<'a>, ExecutionError> {
        self.stepping = directive == Directive::Step;
        self.advance()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended_at.is_some()
    }

    /// The frame of the node the session is suspended before.
    pub fn frame(&self) -> Option<Frame<'_, 'a>> {
        let location = self.arena.location(self.suspended_at?)?;
        Some(Frame {
            source_name: &location.file,
            line: location.line,
            variables: self.evaluator.variables(),
        })
    }

    /// Drive the session to completion, asking `debugger` how to resume at
    /// every suspension.
    pub fn run_to_completion(
        &mut self,
        debugger: &mut dyn Debugger<'a>,
    ) -> Result<Value<'a>, ExecutionError> {
        let mut step = self.start()?;
        loop {
            match step {
                DebugStep::Completed(value) => return Ok(value),
                DebugStep::Suspended { .. } => {
                    let directive = match self.frame() {
                        Some(frame) => debugger.on_break(&frame),
                        None => Directive::Continue,
                    };
                    step = self.resume(directive)?;
                }
            }
        }
    }

    fn advance(&mut self) -> Result<DebugStep<'a>, ExecutionError> {
        let registry = self.registry;
        let stepping = self.stepping;
        let mut should_break = |location: &SourceLocation| {
            stepping || registry.is_registered(&location.file, location.line)
        };
        let should_break: &mut dyn FnMut(&SourceLocation) -> bool = &mut should_break;

        while let Some(&id) = self.statements.get(self.next) {
            if !self.in_statement {
                self.evaluator.begin(id);
                self.in_statement = true;
            }
            self.suspended_at = None;

            let progress = self.evaluator.proceed(Some(&mut *should_break));
            match progress {
                Ok(Progress::Paused(node)) => {
                    let Some(location) = self.arena.location(node) else {
                        continue;
                    };
                    tracing::debug!(
                        source_name = %location.file,
                        line = location.line,
                        stepping,
                        "suspended"
                    );
                    self.suspended_at = Some(node);
                    return Ok(DebugStep::Suspended {
                        source_name: location.file.clone(),
                        line: location.line,
                    });
                }
                Ok(Progress::Done(value)) => {
                    self.in_statement = false;
                    self.last = value;
                    self.next += 1;
                }
                Err(err) => {
                    self.in_statement = false;
                    return Err(err);
                }
            }
        }
        Ok(DebugStep::Completed(self.last.clone()))
    }
}
