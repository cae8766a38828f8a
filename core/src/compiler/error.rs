//! Compilation errors.

use thiserror::Error;

use crate::api::Diagnostic;
use crate::ast::BuildError;
use crate::parser::ParseError;

#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl CompileError {
    /// Convert to a Diagnostic for API boundary.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Parse(err) => err.to_diagnostic(),
            CompileError::Build(err) => err.to_diagnostic(),
        }
    }
}
