use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;

use pest::iterators::Pair;

use crate::ast::{BuildContext, BuildError, Node, NodeArena, NodeId};
use crate::compiler::{CompileError, Scope};
use crate::parser::{
    DEFAULT_MAX_DEPTH, Operator, ParseError, ParseErrorKind, Rule, SourceLocation, Span, UnaryOp,
    operator_of, parse_number, parse_with_max_depth, unescape,
};
use crate::types::{Primitive, Type};
use crate::values::Value;

/// A compiled sequence of statements. The value of a program is the value of
/// its last statement.
#[derive(Debug, Clone)]
pub struct Program<'a> {
    pub arena: NodeArena<'a>,
    pub statements: Vec<NodeId>,
    pub return_type: Type<'a>,
}

/// Compile `ctx.source` with the given input declarations, allowing the
/// default parenthesis nesting.
///
/// With `debug_symbols`, the root node of each statement carries its
/// [`SourceLocation`], and so does every node that starts a line later in
/// evaluation order, so that breakpoints can match any line of a statement.
pub fn compile<'a>(
    inputs: &[(&str, Type<'a>)],
    ctx: &BuildContext<'_>,
    debug_symbols: bool,
) -> Result<Program<'a>, CompileError> {
    compile_with_max_depth(inputs, ctx, debug_symbols, DEFAULT_MAX_DEPTH)
}

/// Like [`compile`], rejecting parentheses nested deeper than `max_depth`.
pub fn compile_with_max_depth<'a>(
    inputs: &[(&str, Type<'a>)],
    ctx: &BuildContext<'_>,
    debug_symbols: bool,
    max_depth: usize,
) -> Result<Program<'a>, CompileError> {
    let pairs = parse_with_max_depth(ctx.source, max_depth)?;
    let mut compiler = Compiler {
        arena: NodeArena::new(),
        scope: Scope::new(inputs),
        ctx,
    };
    let lines = debug_symbols.then(|| LineIndex::new(ctx.source));

    let mut statements = Vec::new();
    for pair in pairs {
        for statement in pair.into_inner() {
            if statement.as_rule() == Rule::EOI {
                continue;
            }
            let id = compiler.statement(statement)?;
            if let Some(lines) = &lines {
                compiler.locate(id, lines);
            }
            statements.push(id);
        }
    }

    let return_type = statements
        .last()
        .map_or(Type::Null, |id| compiler.arena.egress_type(*id));
    tracing::debug!(
        statements = statements.len(),
        nodes = compiler.arena.len(),
        %return_type,
        "compiled program"
    );
    Ok(Program {
        arena: compiler.arena,
        statements,
        return_type,
    })
}

/// Start offsets of the lines of a source.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let starts = core::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// 1-based line of `offset`.
    fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}

struct Compiler<'c, 'a> {
    arena: NodeArena<'a>,
    scope: Scope<'a>,
    ctx: &'c BuildContext<'c>,
}

fn malformed(pair: &Pair<'_, Rule>) -> CompileError {
    CompileError::Parse(ParseError::new(
        ParseErrorKind::Other {
            message: alloc::format!("unexpected {:?} in parse tree", pair.as_rule()),
        },
        Span::from(pair.as_span()),
    ))
}

/// Whether the operator on top of the stack must be reduced before `next`
/// is pushed.
fn reduces_before(top: Operator, next: Operator) -> bool {
    top.precedence() > next.precedence()
        || (top.precedence() == next.precedence() && !next.is_right_associative())
}

impl<'c, 'a> Compiler<'c, 'a> {
    /// Attach locations to the statement root and to every node whose line
    /// differs from the line of the node evaluated before it.
    fn locate(&mut self, root: NodeId, lines: &LineIndex) {
        let file = self.ctx.source_file.unwrap_or("<unknown>");
        let mut previous_line = None;
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            let Some(span) = self.arena.span(id) else {
                continue;
            };
            let line = lines.line(span.0.start);
            if previous_line != Some(line) {
                let location = SourceLocation::from_offset(file, self.ctx.source, span.0.start);
                self.arena.set_location(id, location);
                previous_line = Some(line);
            }
            // Left operands are evaluated first, so they are popped first.
            match self.arena.node(id) {
                Node::Group { inner } => pending.push(*inner),
                Node::Unary { operand, .. } => pending.push(*operand),
                Node::Assign { value, .. } => pending.push(*value),
                Node::Binary(binary) => pending.extend([binary.right, binary.left]),
                Node::Literal { .. } | Node::Variable { .. } => {}
            }
        }
    }

    fn statement(&mut self, pair: Pair<'_, Rule>) -> Result<NodeId, CompileError> {
        match pair.as_rule() {
            Rule::assignment => {
                let span = Span::from(pair.as_span());
                let mut inner = pair.into_inner();
                let (Some(name), Some(expression)) = (inner.next(), inner.next()) else {
                    return Err(CompileError::Parse(ParseError::new(
                        ParseErrorKind::Other {
                            message: "malformed assignment".to_string(),
                        },
                        span,
                    )));
                };
                let value = self.expression(expression)?;
                let ty = self.arena.egress_type(value);
                let name = name.as_str();
                self.scope.declare(name, ty);
                Ok(self.arena.push(
                    Node::Assign {
                        name: name.to_string(),
                        value,
                        ty,
                    },
                    Some(span),
                ))
            }
            Rule::expression => self.expression(pair),
            _ => Err(malformed(&pair)),
        }
    }

    /// Combine a flat `operand (op operand)*` chain by operator precedence.
    fn expression(&mut self, pair: Pair<'_, Rule>) -> Result<NodeId, CompileError> {
        let span = Span::from(pair.as_span());
        let mut operands: Vec<NodeId> = Vec::new();
        let mut pending: Vec<Operator> = Vec::new();

        for part in pair.into_inner() {
            if part.as_rule() == Rule::operand {
                operands.push(self.operand(part)?);
                continue;
            }
            let op = operator_of(part.as_rule()).ok_or_else(|| malformed(&part))?;
            while let Some(&top) = pending.last() {
                if !reduces_before(top, op) {
                    break;
                }
                pending.pop();
                self.reduce(top, &mut operands)?;
            }
            pending.push(op);
        }
        while let Some(top) = pending.pop() {
            self.reduce(top, &mut operands)?;
        }

        operands.pop().ok_or_else(|| {
            CompileError::Parse(ParseError::new(
                ParseErrorKind::Other {
                    message: "empty expression".to_string(),
                },
                span,
            ))
        })
    }

    fn reduce(&mut self, op: Operator, operands: &mut Vec<NodeId>) -> Result<(), CompileError> {
        let right = operands.pop().unwrap_or(NodeId::INVALID);
        let left = operands.pop().unwrap_or(NodeId::INVALID);
        let id = self.arena.binary(op, left, right, self.ctx)?;
        operands.push(id);
        Ok(())
    }

    fn operand(&mut self, pair: Pair<'_, Rule>) -> Result<NodeId, CompileError> {
        let span = Span::from(pair.as_span());
        let mut prefixes = Vec::new();
        let mut sign_start = None;
        let mut primary = None;
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::neg => {
                    sign_start = Some(part.as_span().start());
                    prefixes.push(UnaryOp::Neg);
                }
                Rule::not => {
                    sign_start = None;
                    prefixes.push(UnaryOp::Not);
                }
                // The sign is part of the literal, so `-2147483648` is an int.
                Rule::number if prefixes.last() == Some(&UnaryOp::Neg) => {
                    prefixes.pop();
                    let start = sign_start.unwrap_or(part.as_span().start());
                    primary = Some(self.negative_number(&part, start)?);
                }
                _ => primary = Some(self.primary(part)?),
            }
        }
        let mut id = primary.ok_or_else(|| {
            CompileError::Parse(ParseError::new(
                ParseErrorKind::Other {
                    message: "missing operand".to_string(),
                },
                span.clone(),
            ))
        })?;
        for op in prefixes.into_iter().rev() {
            id = self.unary(op, id, span.clone())?;
        }
        Ok(id)
    }

    fn primary(&mut self, pair: Pair<'_, Rule>) -> Result<NodeId, CompileError> {
        let span = Span::from(pair.as_span());
        let literal = |value: Value<'a>, ty: Type<'a>| Node::Literal { value, ty };
        let node = match pair.as_rule() {
            Rule::null => literal(Value::Null, Type::Null),
            Rule::boolean => literal(
                Value::Boolean(pair.as_str() == "true"),
                Type::Boxed(Primitive::Boolean),
            ),
            Rule::number => {
                let (value, ty) = parse_number(pair.as_str())
                    .map_err(|kind| ParseError::new(kind, span.clone()))?;
                literal(value, ty)
            }
            Rule::string => {
                let raw = pair.into_inner().next().map_or("", |inner| inner.as_str());
                let text = unescape(raw).map_err(|kind| ParseError::new(kind, span.clone()))?;
                literal(Value::str(text), Type::Str)
            }
            Rule::ident => {
                let name = pair.as_str();
                let ty = match self.scope.lookup(name) {
                    Some(ty) => ty,
                    None if self.ctx.strong_typing => {
                        return Err(BuildError::UndeclaredVariable {
                            name: name.to_string(),
                            span: Some(span),
                        }
                        .into());
                    }
                    None => Type::Any,
                };
                Node::Variable {
                    name: name.to_string(),
                    ty,
                }
            }
            Rule::grouped => {
                let inner = pair.into_inner().next().ok_or_else(|| {
                    CompileError::Parse(ParseError::new(
                        ParseErrorKind::Other {
                            message: "empty group".to_string(),
                        },
                        span.clone(),
                    ))
                })?;
                let inner = self.expression(inner)?;
                Node::Group { inner }
            }
            _ => return Err(malformed(&pair)),
        };
        Ok(self.arena.push(node, Some(span)))
    }

    fn negative_number(&mut self, pair: &Pair<'_, Rule>, start: usize) -> Result<NodeId, CompileError> {
        let span = Span::new(start, pair.as_span().end());
        let text = alloc::format!("-{}", pair.as_str());
        let (value, ty) =
            parse_number(&text).map_err(|kind| ParseError::new(kind, span.clone()))?;
        Ok(self.arena.push(Node::Literal { value, ty }, Some(span)))
    }

    fn unary(&mut self, op: UnaryOp, operand: NodeId, span: Span) -> Result<NodeId, CompileError> {
        let operand_ty = self.arena.egress_type(operand);

        // Fold negative number literals.
        if op == UnaryOp::Neg {
            if let Node::Literal { value, ty } = self.arena.node(operand) {
                if let Some(negated) = negate_literal(value) {
                    let node = Node::Literal {
                        value: negated,
                        ty: *ty,
                    };
                    return Ok(self.arena.push(node, Some(span)));
                }
            }
        }

        let accepted = match op {
            UnaryOp::Neg => operand_ty.is_number() || operand_ty == Type::Any,
            UnaryOp::Not => operand_ty.is_boolean() || operand_ty == Type::Any,
        };
        if self.ctx.strong_typing && !accepted {
            return Err(BuildError::InvalidUnaryOperand {
                op,
                ty: operand_ty.to_string(),
                span: Some(span),
            }
            .into());
        }

        let ty = match op {
            UnaryOp::Neg => operand_ty,
            UnaryOp::Not => Type::Primitive(Primitive::Boolean),
        };
        Ok(self.arena.push(Node::Unary { op, operand, ty }, Some(span)))
    }
}

fn negate_literal<'a>(value: &Value<'a>) -> Option<Value<'a>> {
    let negated = match value {
        Value::Byte(n) => Value::Byte(n.wrapping_neg()),
        Value::Short(n) => Value::Short(n.wrapping_neg()),
        Value::Int(n) => Value::Int(n.wrapping_neg()),
        Value::Long(n) => Value::Long(n.wrapping_neg()),
        Value::Float(n) => Value::Float(-n),
        Value::Double(n) => Value::Double(-n),
        Value::BigInteger(n) => Value::BigInteger(-n),
        Value::BigDecimal(n) => Value::BigDecimal(-n),
        _ => return None,
    };
    Some(negated)
}
