//! Construction of binary operation nodes.
//!
//! Building a node decides its egress type once, checks (in strong typing
//! mode) that the operands can meet under the operator, possibly rewrites a
//! literal right operand through the conversion registry, and resolves the
//! operand tags that can be known up front.

use alloc::string::ToString;

use crate::ast::error::{BuildError, Side};
use crate::ast::{BinaryNode, Node, NodeArena, NodeId};
use crate::conversion::{ConversionRegistry, EqualityCompatibility};
use crate::parser::{Operator, SourceLocation, Span};
use crate::types::{OperandType, Type, result_type};

/// What node construction needs to know about the compilation in progress.
pub struct BuildContext<'c> {
    pub strong_typing: bool,
    pub conversions: &'c ConversionRegistry,
    pub equality: &'c dyn EqualityCompatibility,
    /// Source text, used to turn spans into line and column locations.
    pub source: &'c str,
    pub source_file: Option<&'c str>,
}

impl BuildContext<'_> {
    fn location_of(&self, span: &Span) -> SourceLocation {
        SourceLocation::from_offset(
            self.source_file.unwrap_or("<unknown>"),
            self.source,
            span.0.start,
        )
    }
}

/// Whether two types can meet under an operator without conversion.
fn are_compatible(left: &Type<'_>, right: &Type<'_>, conversions: &ConversionRegistry) -> bool {
    *left == Type::Null
        || *right == Type::Null
        || (left.is_number() && right.is_number())
        || ((left.is_primitive() || right.is_primitive())
            && conversions.can_convert(&left.boxed(), &right.boxed()))
}

impl<'a> NodeArena<'a> {
    /// Build a binary operation node over two existing nodes.
    pub fn binary(
        &mut self,
        op: Operator,
        left: NodeId,
        right: NodeId,
        ctx: &BuildContext<'_>,
    ) -> Result<NodeId, BuildError> {
        if self.get(left).is_none() {
            return Err(BuildError::MissingOperand {
                side: Side::Left,
                op,
            });
        }
        if self.get(right).is_none() {
            return Err(BuildError::MissingOperand {
                side: Side::Right,
                op,
            });
        }

        let span = match (self.span(left), self.span(right)) {
            (Some(l), Some(r)) => Some(Span::combine(&l, &r)),
            (l, r) => l.or(r),
        };
        let l_egress = self.egress_type(left);
        let mut r_egress = self.egress_type(right);

        // String concatenation wins over every numeric rule.
        if op == Operator::Add && (l_egress == Type::Str || r_egress == Type::Str) {
            let node = BinaryNode {
                op,
                left,
                right,
                egress: Type::Str,
                l_type: OperandType::of_type(&l_egress),
                r_type: OperandType::of_type(&r_egress),
            };
            return Ok(self.push(Node::Binary(node), span));
        }

        let egress = result_type(op, l_egress, r_egress);
        let mut right = right;

        if ctx.strong_typing
            && !l_egress.is_assignable_from(&r_egress)
            && !r_egress.is_assignable_from(&l_egress)
        {
            // Integral compared against floating is tolerated as is.
            let requires_conversion =
                !(l_egress.is_integral_kind() && r_egress.is_floating_kind());

            if requires_conversion
                && self.is_literal(right)
                && ctx.conversions.can_convert(&l_egress, &r_egress)
            {
                let target = if op.is_arithmetic() { egress } else { l_egress };
                right = self.convert_literal(right, target, ctx)?;
                r_egress = target;
            } else if !(are_compatible(&l_egress, &r_egress, ctx.conversions)
                || (op.is_equality() && ctx.equality.are_equality_compatible(&l_egress, &r_egress)))
            {
                let span = self.span(left).or_else(|| self.span(right));
                return Err(BuildError::IncompatibleTypes {
                    op,
                    left: l_egress.to_string(),
                    right: r_egress.to_string(),
                    location: span.as_ref().map(|span| ctx.location_of(span)),
                    span,
                });
            }
        }

        let (l_type, r_type) = if l_egress == r_egress {
            let tag = OperandType::of_type(&l_egress);
            (tag, tag)
        } else {
            (
                self.literal_operand_type(left, &l_egress),
                self.literal_operand_type(right, &r_egress),
            )
        };

        let node = BinaryNode {
            op,
            left,
            right,
            egress,
            l_type,
            r_type,
        };
        Ok(self.push(Node::Binary(node), span))
    }

    fn literal_operand_type(&self, id: NodeId, egress: &Type<'a>) -> OperandType {
        if self.is_literal(id) {
            OperandType::of_type(egress)
        } else {
            OperandType::Unresolved
        }
    }

    /// Materialize the converted value of a literal as a new literal node.
    fn convert_literal(
        &mut self,
        id: NodeId,
        target: Type<'a>,
        ctx: &BuildContext<'_>,
    ) -> Result<NodeId, BuildError> {
        let span = self.span(id);
        let Node::Literal { value, .. } = self.node(id) else {
            return Ok(id);
        };
        let converted = ctx
            .conversions
            .convert(value, target)
            .map_err(|error| BuildError::Conversion {
                error,
                span: span.clone(),
            })?;
        tracing::debug!(
            from = %value,
            to = %target,
            "converted literal operand"
        );
        Ok(self.push(
            Node::Literal {
                value: converted,
                ty: target,
            },
            span,
        ))
    }

    /// The deepest binary node on the right spine of `root`.
    pub fn right_most(&self, root: NodeId) -> Result<NodeId, BuildError> {
        let mut current = match self.binary_node(root) {
            Some(_) => root,
            None => return Err(BuildError::NotBinary { node: root }),
        };
        while let Some(binary) = self.binary_node(current) {
            if self.binary_node(binary.right).is_none() {
                break;
            }
            current = binary.right;
        }
        Ok(current)
    }

    /// Replace the right operand of the deepest binary node on the right
    /// spine of `root` with `node`.
    ///
    /// The right operand tag of the node that received `node` is resolved
    /// again from its egress type. Nodes above it keep their tags.
    pub fn set_right_most(&mut self, root: NodeId, node: NodeId) -> Result<NodeId, BuildError> {
        let target = self.right_most(root)?;
        self.replace_right(target, node)?;
        Ok(target)
    }

    /// Replace the right operand of the binary node `parent` with `node`.
    pub fn replace_right(&mut self, parent: NodeId, node: NodeId) -> Result<(), BuildError> {
        let Some(op) = self.binary_node(parent).map(|binary| binary.op) else {
            return Err(BuildError::NotBinary { node: parent });
        };
        if self.get(node).is_none() {
            return Err(BuildError::MissingOperand {
                side: Side::Right,
                op,
            });
        }
        let r_type = OperandType::of_type(&self.egress_type(node));
        match self.node_mut(parent) {
            Node::Binary(binary) => {
                tracing::trace!(?parent, ?node, ?r_type, "grafted right operand");
                binary.right = node;
                binary.r_type = r_type;
                Ok(())
            }
            _ => Err(BuildError::NotBinary { node: parent }),
        }
    }
}
