//! Runtime evaluation errors.
//!
//! # Error Categories
//!
//! - **Runtime errors**: the kernel rejected the operands it was given
//!   (division by zero, a null operand, a string that does not parse as the
//!   number it is combined with).
//!
//! - **Resource exceeded**: evaluation went deeper than
//!   [`ExecutionOptions::max_depth`](super::ExecutionOptions).
//!
//! - **Unsupported**: an evaluation entry point that a node does not provide
//!   was invoked. This is a host programming error, not a script error.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;

use crate::api::{Diagnostic, Severity};
use crate::conversion::ConversionError;
use crate::parser::{Operator, Span, UnaryOp};
use crate::types::TypeTag;

/// An evaluation failure, located at the node that raised it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionError {
    pub kind: ExecutionErrorKind,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionErrorKind {
    Runtime(RuntimeError),

    /// Evaluation recursion depth exceeded.
    ResourceExceeded { depth: usize, max_depth: usize },

    /// The node cannot be evaluated through the requested entry point.
    Unsupported { node: &'static str },
}

/// Errors raised by the arithmetic and logic kernel, or by variable lookup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("null operand for '{op}'")]
    NullOperand { op: Operator },

    #[error("cannot apply '{op}' to {left} and {right}")]
    IncompatibleOperands {
        op: Operator,
        left: TypeTag,
        right: TypeTag,
    },

    #[error("arithmetic overflow in '{op}'")]
    Overflow { op: Operator },

    #[error("cannot apply '{op}' to {operand}")]
    InvalidUnaryOperand { op: UnaryOp, operand: TypeTag },

    #[error("unbound variable '{name}'")]
    UnboundVariable { name: String },

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl ExecutionError {
    pub fn new(kind: ExecutionErrorKind, span: Option<Span>) -> Self {
        Self { kind, span }
    }

    pub fn is_resource_exceeded(&self) -> bool {
        matches!(self.kind, ExecutionErrorKind::ResourceExceeded { .. })
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match &self.kind {
            ExecutionErrorKind::Runtime(RuntimeError::DivisionByZero) => "R001",
            ExecutionErrorKind::Runtime(RuntimeError::NullOperand { .. }) => "R002",
            ExecutionErrorKind::Runtime(RuntimeError::IncompatibleOperands { .. })
            | ExecutionErrorKind::Runtime(RuntimeError::InvalidUnaryOperand { .. }) => "R003",
            ExecutionErrorKind::Runtime(RuntimeError::Overflow { .. }) => "R004",
            ExecutionErrorKind::Runtime(RuntimeError::UnboundVariable { .. }) => "R005",
            ExecutionErrorKind::Runtime(RuntimeError::Conversion(_)) => "R006",
            ExecutionErrorKind::ResourceExceeded { .. } => "R100",
            ExecutionErrorKind::Unsupported { .. } => "R999",
        };
        Diagnostic {
            severity: Severity::Error,
            message: self.kind.to_string(),
            span: self.span.clone().unwrap_or_default(),
            related: Vec::new(),
            help: Vec::new(),
            code: Some(code.to_string()),
        }
    }
}

impl fmt::Display for ExecutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionErrorKind::Runtime(e) => write!(f, "{}", e),
            ExecutionErrorKind::ResourceExceeded { depth, max_depth } => write!(
                f,
                "Evaluation stack overflow: depth {} exceeds maximum of {}",
                depth, max_depth
            ),
            ExecutionErrorKind::Unsupported { node } => {
                write!(f, "{} nodes do not support interpreted evaluation", node)
            }
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(span) = &self.span {
            write!(f, " at {}..{}", span.0.start, span.0.end)?;
        }
        Ok(())
    }
}

impl core::error::Error for ExecutionError {}

impl From<RuntimeError> for ExecutionErrorKind {
    fn from(e: RuntimeError) -> Self {
        ExecutionErrorKind::Runtime(e)
    }
}

impl From<ConversionError> for ExecutionErrorKind {
    fn from(e: ConversionError) -> Self {
        ExecutionErrorKind::Runtime(RuntimeError::Conversion(e))
    }
}
