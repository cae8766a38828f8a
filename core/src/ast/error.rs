use alloc::string::{String, ToString};
use alloc::vec::Vec;
use alloc::{format, vec};
use core::fmt;

use thiserror::Error;

use crate::api::{Diagnostic, RelatedInfo, Severity};
use crate::ast::NodeId;
use crate::conversion::ConversionError;
use crate::parser::{Operator, SourceLocation, Span, UnaryOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Errors raised while building nodes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// An operand id does not refer to a node of the arena. This is a defect
    /// in whatever assembled the tree, not in the script.
    #[error("missing {side} operand for '{op}'")]
    MissingOperand { side: Side, op: Operator },

    #[error("incompatible types for '{op}': {left} and {right}")]
    IncompatibleTypes {
        op: Operator,
        left: String,
        right: String,
        span: Option<Span>,
        location: Option<SourceLocation>,
    },

    #[error("undeclared variable '{name}'")]
    UndeclaredVariable { name: String, span: Option<Span> },

    #[error("operator '{op}' cannot be applied to {ty}")]
    InvalidUnaryOperand {
        op: UnaryOp,
        ty: String,
        span: Option<Span>,
    },

    #[error("{error}")]
    Conversion {
        #[source]
        error: ConversionError,
        span: Option<Span>,
    },

    /// Right-spine surgery was requested on a node that is not a binary
    /// operation.
    #[error("node {node:?} is not a binary operation")]
    NotBinary { node: NodeId },
}

impl BuildError {
    pub fn span(&self) -> Option<Span> {
        match self {
            BuildError::IncompatibleTypes { span, .. }
            | BuildError::UndeclaredVariable { span, .. }
            | BuildError::InvalidUnaryOperand { span, .. }
            | BuildError::Conversion { span, .. } => span.clone(),
            BuildError::MissingOperand { .. } | BuildError::NotBinary { .. } => None,
        }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help): (&str, Vec<String>) = match self {
            BuildError::IncompatibleTypes { op, .. } if op.is_equality() => (
                "T001",
                vec!["Register an equality compatibility rule for these types".to_string()],
            ),
            BuildError::IncompatibleTypes { .. } => ("T001", vec![]),
            BuildError::UndeclaredVariable { name, .. } => (
                "T002",
                vec![format!("Declare '{}' as an input or assign it first", name)],
            ),
            BuildError::InvalidUnaryOperand { .. } => ("T003", vec![]),
            BuildError::Conversion { .. } => ("T004", vec![]),
            BuildError::MissingOperand { .. } | BuildError::NotBinary { .. } => ("T999", vec![]),
        };

        let related = match self {
            BuildError::IncompatibleTypes {
                location: Some(location),
                span: Some(span),
                ..
            } => vec![RelatedInfo {
                span: span.clone(),
                message: format!("at {}", location),
            }],
            _ => Vec::new(),
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.to_string(),
            span: self.span().unwrap_or(Span(0..0)),
            related,
            help,
            code: Some(code.to_string()),
        }
    }
}
