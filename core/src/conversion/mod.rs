//! Type conversion services used by operator construction and evaluation.

mod compat;
mod error;
mod registry;

pub use compat::{ClassPairs, EqualityCompatibility, RejectAll};
pub use error::ConversionError;
pub use registry::{ConversionHandler, ConversionRegistry};
