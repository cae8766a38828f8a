//! Core evaluation logic.

use alloc::vec::Vec;

use crate::ast::{Node, NodeArena, NodeId};
use crate::conversion::ConversionRegistry;
use crate::evaluator::{
    EvaluationMode, ExecutionError, ExecutionErrorKind, ExecutionOptions, RuntimeError,
    VariableResolver,
    operators::{do_operation, do_unary},
};
use crate::parser::{Operator, SourceLocation};
use crate::values::Value;

/// Pending work of an evaluation. Every task leaves exactly one more value
/// on the value stack than it consumes.
#[derive(Debug, Clone, Copy)]
enum Task {
    /// Evaluate a node at the given nesting depth.
    Eval { id: NodeId, depth: usize },
    /// Apply a prefix operator to the value on top of the stack.
    Unary(NodeId),
    /// Bind the value on top of the stack.
    Assign(NodeId),
    /// The left operand is on top of the stack.
    Right { id: NodeId, depth: usize },
    /// Both operands are on top of the stack.
    Apply(NodeId),
}

/// Where a resumable evaluation stopped.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Progress<'a> {
    Done(Value<'a>),
    /// Paused before a located node. Proceeding again evaluates it.
    Paused(NodeId),
}

/// Evaluator over a [`NodeArena`] that keeps its own task stack, so nesting
/// depth is bounded by [`ExecutionOptions::max_depth`] and never by the
/// native stack.
///
/// The arena is only read, so one compiled tree can be evaluated by many
/// evaluators at once. The mode is fixed for the lifetime of the evaluator.
pub struct Evaluator<'r, 'a> {
    arena: &'r NodeArena<'a>,
    conversions: &'r ConversionRegistry,
    resolver: &'r mut dyn VariableResolver<'a>,
    options: ExecutionOptions,
    mode: EvaluationMode,
    tasks: Vec<Task>,
    values: Vec<Value<'a>>,
    resuming: bool,
}

impl<'r, 'a> Evaluator<'r, 'a> {
    pub fn new(
        arena: &'r NodeArena<'a>,
        conversions: &'r ConversionRegistry,
        resolver: &'r mut dyn VariableResolver<'a>,
        options: ExecutionOptions,
        mode: EvaluationMode,
    ) -> Self {
        Self {
            arena,
            conversions,
            resolver,
            options,
            mode,
            tasks: Vec::new(),
            values: Vec::new(),
            resuming: false,
        }
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// The bindings visible to the evaluation, including assigned locals.
    pub fn variables(&self) -> &dyn VariableResolver<'a> {
        &*self.resolver
    }

    /// Evaluate statements in order. The result is the value of the last
    /// statement, or null for an empty program.
    pub fn run(&mut self, statements: &[NodeId]) -> Result<Value<'a>, ExecutionError> {
        let mut last = Value::Null;
        for id in statements {
            last = self.eval(*id)?;
        }
        Ok(last)
    }

    /// Evaluate the tree rooted at `id`. Source locations are ignored.
    pub fn eval(&mut self, id: NodeId) -> Result<Value<'a>, ExecutionError> {
        self.begin(id);
        match self.proceed(None)? {
            Progress::Done(value) => Ok(value),
            // Without a pause check nothing pauses.
            Progress::Paused(_) => Ok(Value::Null),
        }
    }

    /// Schedule the tree rooted at `id` for [`Evaluator::proceed`].
    pub(crate) fn begin(&mut self, id: NodeId) {
        self.tasks.clear();
        self.values.clear();
        self.resuming = false;
        self.tasks.push(Task::Eval { id, depth: 0 });
    }

    /// Run the scheduled evaluation until it finishes or `pause` asks to stop
    /// before a located node. After a pause, the next call evaluates that
    /// node without asking again.
    pub(crate) fn proceed(
        &mut self,
        pause: Option<&mut dyn FnMut(&SourceLocation) -> bool>,
    ) -> Result<Progress<'a>, ExecutionError> {
        let result = self.drive(pause);
        if result.is_err() {
            self.tasks.clear();
            self.values.clear();
        }
        result
    }

    fn drive(
        &mut self,
        mut pause: Option<&mut dyn FnMut(&SourceLocation) -> bool>,
    ) -> Result<Progress<'a>, ExecutionError> {
        let arena = self.arena;
        let mut resumed = core::mem::take(&mut self.resuming);

        while let Some(task) = self.tasks.pop() {
            match task {
                Task::Eval { id, depth } => {
                    let check = pause.as_deref_mut().filter(|_| !core::mem::take(&mut resumed));
                    if let Some(pause) = check {
                        if let Some(location) = arena.location(id) {
                            if pause(location) {
                                self.tasks.push(task);
                                self.resuming = true;
                                return Ok(Progress::Paused(id));
                            }
                        }
                    }
                    self.enter(id, depth)?;
                }

                Task::Unary(id) => {
                    let Node::Unary { op, .. } = arena.node(id) else {
                        continue;
                    };
                    let value = self.pop_value();
                    let result = do_unary(*op, &value).map_err(|e| self.error(id, e))?;
                    self.values.push(result);
                }

                Task::Assign(id) => {
                    let Node::Assign { name, .. } = arena.node(id) else {
                        continue;
                    };
                    let value = self.pop_value();
                    self.resolver.assign(name, value.clone());
                    self.values.push(value);
                }

                Task::Right { id, depth } => {
                    let Some(binary) = arena.binary_node(id) else {
                        continue;
                    };
                    // Short-circuit logic
                    let short_circuits = matches!(
                        (binary.op, self.values.last()),
                        (Operator::And, Some(Value::Boolean(false)))
                            | (Operator::Or, Some(Value::Boolean(true)))
                    );
                    if !short_circuits {
                        self.tasks.push(Task::Apply(id));
                        self.tasks.push(Task::Eval {
                            id: binary.right,
                            depth: depth + 1,
                        });
                    }
                }

                Task::Apply(id) => {
                    let Some(binary) = arena.binary_node(id) else {
                        continue;
                    };
                    let right = self.pop_value();
                    let left = self.pop_value();
                    let l_tag = binary.l_type.resolve(&left);
                    let r_tag = binary.r_type.resolve(&right);
                    tracing::trace!(op = %binary.op, %l_tag, %r_tag, "binary dispatch");

                    let result = do_operation(binary.op, l_tag, &left, r_tag, &right, self.conversions)
                        .map_err(|e| self.error(id, e))?;
                    self.values.push(result);
                }
            }
        }

        Ok(Progress::Done(self.pop_value()))
    }

    /// Start evaluating `id`: leaves push their value, inner nodes schedule
    /// their operands.
    fn enter(&mut self, id: NodeId, depth: usize) -> Result<(), ExecutionError> {
        if depth >= self.options.max_depth {
            return Err(self.error(
                id,
                ExecutionErrorKind::ResourceExceeded {
                    depth,
                    max_depth: self.options.max_depth,
                },
            ));
        }

        let arena = self.arena;
        let child = depth + 1;
        match arena.node(id) {
            Node::Literal { value, .. } => self.values.push(value.clone()),

            Node::Variable { name, .. } => {
                let value = self.resolver.resolve(name).ok_or_else(|| {
                    self.error(id, RuntimeError::UnboundVariable { name: name.clone() })
                })?;
                self.values.push(value);
            }

            Node::Group { inner } => self.tasks.push(Task::Eval {
                id: *inner,
                depth: child,
            }),

            Node::Unary { operand, .. } => {
                self.tasks.push(Task::Unary(id));
                self.tasks.push(Task::Eval {
                    id: *operand,
                    depth: child,
                });
            }

            Node::Assign { value, .. } => {
                self.tasks.push(Task::Assign(id));
                self.tasks.push(Task::Eval {
                    id: *value,
                    depth: child,
                });
            }

            Node::Binary(_) if self.mode == EvaluationMode::Interpreted => {
                return Err(self.error(
                    id,
                    ExecutionErrorKind::Unsupported {
                        node: "binary operation",
                    },
                ));
            }

            Node::Binary(binary) => {
                self.tasks.push(Task::Right { id, depth });
                self.tasks.push(Task::Eval {
                    id: binary.left,
                    depth: child,
                });
            }
        }
        Ok(())
    }

    fn pop_value(&mut self) -> Value<'a> {
        self.values.pop().unwrap_or(Value::Null)
    }

    fn error(&self, id: NodeId, kind: impl Into<ExecutionErrorKind>) -> ExecutionError {
        ExecutionError::new(kind.into(), self.arena.span(id))
    }
}
