//! Source-level macro expansion, applied before parsing.

mod processor;

pub use processor::{Macro, MacroProcessor, parse_macros};
