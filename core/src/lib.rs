//! Core of the Velo expression language.
//!
//! Source text is parsed by [`parser`], built into a typed node tree by
//! [`compiler`] (through the checks in [`ast`]), and walked by
//! [`evaluator`]. [`api`] ties these together behind an engine.

extern crate alloc;

pub mod api;
pub mod ast;
pub mod compiler;
pub mod conversion;
pub mod debug;
pub mod evaluator;
pub mod macros;
pub mod parser;
pub mod types;
pub mod values;
