use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::parser::{Operator, SourceLocation, Span, UnaryOp};
use crate::types::{OperandType, Type};
use crate::values::Value;

/// Index of a node in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel for "no node". Never returned by [`NodeArena::push`].
    pub const INVALID: NodeId = NodeId(u32::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    Literal { value: Value<'a>, ty: Type<'a> },
    Variable { name: String, ty: Type<'a> },
    /// A parenthesised sub-expression.
    Group { inner: NodeId },
    Unary { op: UnaryOp, operand: NodeId, ty: Type<'a> },
    Assign { name: String, value: NodeId, ty: Type<'a> },
    Binary(BinaryNode<'a>),
}

/// A binary operation with its construction-time type information.
///
/// `egress` is decided once when the node is built. `l_type` and `r_type`
/// are the operand tags the kernel dispatches on; an unresolved tag is taken
/// from the operand value on every evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryNode<'a> {
    pub op: Operator,
    pub left: NodeId,
    pub right: NodeId,
    pub egress: Type<'a>,
    pub l_type: OperandType,
    pub r_type: OperandType,
}

/// Owner of every node of a compiled program.
///
/// Nodes refer to each other by [`NodeId`]. Spans and debug locations are
/// kept in side tables indexed the same way.
#[derive(Debug, Default, Clone)]
pub struct NodeArena<'a> {
    nodes: Vec<Node<'a>>,
    spans: Vec<Option<Span>>,
    locations: Vec<Option<SourceLocation>>,
}

impl<'a> NodeArena<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node<'a>, span: Option<Span>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.spans.push(span);
        self.locations.push(None);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<'a>> {
        self.nodes.get(id.index())
    }

    /// The node behind `id`. Ids only come from this arena, so lookup cannot
    /// fail for a well-formed tree.
    pub fn node(&self, id: NodeId) -> &Node<'a> {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<'a> {
        &mut self.nodes[id.index()]
    }

    pub fn binary_node(&self, id: NodeId) -> Option<&BinaryNode<'a>> {
        match self.get(id) {
            Some(Node::Binary(binary)) => Some(binary),
            _ => None,
        }
    }

    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.spans.get(id.index()).cloned().flatten()
    }

    pub fn location(&self, id: NodeId) -> Option<&SourceLocation> {
        self.locations.get(id.index()).and_then(Option::as_ref)
    }

    pub fn set_location(&mut self, id: NodeId, location: SourceLocation) {
        if let Some(slot) = self.locations.get_mut(id.index()) {
            *slot = Some(location);
        }
    }

    /// The static type the node produces.
    pub fn egress_type(&self, id: NodeId) -> Type<'a> {
        match self.node(id) {
            Node::Literal { ty, .. }
            | Node::Variable { ty, .. }
            | Node::Unary { ty, .. }
            | Node::Assign { ty, .. } => *ty,
            Node::Group { inner } => self.egress_type(*inner),
            Node::Binary(binary) => binary.egress,
        }
    }

    /// Only literal nodes are literals. A binary operation over two literals
    /// is not folded and is not a literal.
    pub fn is_literal(&self, id: NodeId) -> bool {
        matches!(self.get(id), Some(Node::Literal { .. }))
    }

    /// Fully parenthesised rendering of the tree under `id`, for tests and
    /// debug output.
    pub fn render(&self, id: NodeId) -> String {
        match self.get(id) {
            None => String::from("<invalid>"),
            Some(Node::Literal {
                value: Value::Str(s),
                ..
            }) => format!("{:?}", s),
            Some(Node::Literal { value, .. }) => format!("{}", value),
            Some(Node::Variable { name, .. }) => name.clone(),
            Some(Node::Group { inner }) => self.render(*inner),
            Some(Node::Unary { op, operand, .. }) => format!("{}{}", op, self.render(*operand)),
            Some(Node::Assign { name, value, .. }) => {
                format!("{} = {}", name, self.render(*value))
            }
            Some(Node::Binary(binary)) => format!(
                "({} {} {})",
                self.render(binary.left),
                binary.op,
                self.render(binary.right)
            ),
        }
    }
}
