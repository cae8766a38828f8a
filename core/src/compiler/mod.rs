//! Compiler from source text to a tree of nodes.
//!
//! The grammar yields flat operand/operator chains; the compiler applies
//! operator precedence, resolves identifiers against the declared scope and
//! builds every node through the [`NodeArena`](crate::ast::NodeArena) so that
//! type checks and literal conversions happen at construction.

mod compiler;
mod error;
mod scope;

pub use compiler::{Program, compile, compile_with_max_depth};
pub use error::CompileError;
pub use scope::Scope;
