//! Public error types for the Velo API.
//!
//! This module defines the stable error types exposed to library users.
//! Internal errors ([`CompileError`], [`ExecutionError`]) are converted to
//! these public types at API boundaries, together with the source text their
//! spans point into.

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::compiler::CompileError;
use crate::evaluator::{ExecutionError, ExecutionErrorKind};
use crate::parser::Span;

/// Public error type for all Velo operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid API usage (e.g. an unknown class name during setup).
    Api(String),

    /// Compilation errors (parse errors, type errors, failed literal
    /// conversions).
    ///
    /// `source` is the text the diagnostics' spans refer to, after macro
    /// expansion.
    Compilation {
        diagnostics: Vec<Diagnostic>,
        source: String,
    },

    /// Runtime errors during evaluation (e.g. division by zero).
    Runtime {
        diagnostic: Diagnostic,
        source: String,
    },

    /// Resource limits exceeded (evaluation depth).
    ResourceExceeded(String),
}

impl Error {
    pub(crate) fn compilation(err: CompileError, source: &str) -> Self {
        Error::Compilation {
            diagnostics: vec![err.to_diagnostic()],
            source: source.to_string(),
        }
    }

    pub(crate) fn execution(err: ExecutionError, source: &str) -> Self {
        if let ExecutionErrorKind::ResourceExceeded { .. } = err.kind {
            return Error::ResourceExceeded(err.kind.to_string());
        }
        Error::Runtime {
            diagnostic: err.to_diagnostic(),
            source: source.to_string(),
        }
    }

    /// Diagnostics carried by this error, if any.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::Compilation { diagnostics, .. } => diagnostics,
            Error::Runtime { diagnostic, .. } => core::slice::from_ref(diagnostic),
            Error::Api(_) | Error::ResourceExceeded(_) => &[],
        }
    }

    /// Source text the diagnostics' spans refer to.
    pub fn source_text(&self) -> Option<&str> {
        match self {
            Error::Compilation { source, .. } | Error::Runtime { source, .. } => Some(source),
            Error::Api(_) | Error::ResourceExceeded(_) => None,
        }
    }

    /// Error code of the first diagnostic, e.g. `"T001"`.
    pub fn code(&self) -> Option<&str> {
        self.diagnostics().first()?.code.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Api(msg) => write!(f, "API error: {}", msg),
            Error::Compilation { diagnostics, .. } => {
                let error_count = diagnostics
                    .iter()
                    .filter(|d| d.severity == Severity::Error)
                    .count();
                write!(f, "Compilation failed with {} error(s)", error_count)?;
                if let Some(first) = diagnostics.first() {
                    write!(f, ": {}", first.message)?;
                }
                Ok(())
            }
            Error::Runtime { diagnostic, .. } => write!(f, "Runtime error: {}", diagnostic.message),
            Error::ResourceExceeded(msg) => write!(f, "Resource limit exceeded: {}", msg),
        }
    }
}

impl core::error::Error for Error {}

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue.
    pub span: Span,

    /// Related locations that provide additional context.
    pub related: Vec<RelatedInfo>,

    /// Help texts suggesting how to fix the issue.
    pub help: Vec<String>,

    /// Optional error code (e.g., "T001") for documentation lookup.
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - compilation or evaluation cannot succeed.
    Error,
    /// Warning - suspicious code that might be wrong.
    Warning,
    /// Info - informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Related information for a diagnostic (e.g. "left operand is String").
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedInfo {
    /// Source location of the related information.
    pub span: Span,

    /// Message explaining the relevance.
    pub message: String,
}
