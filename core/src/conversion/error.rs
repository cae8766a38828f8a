use alloc::string::String;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("cannot convert {from} to {to}")]
    Unsupported { from: String, to: String },

    #[error("'{text}' is not a valid {to}")]
    InvalidLiteral { text: String, to: String },

    #[error("{value} is out of range for {to}")]
    OutOfRange { value: String, to: String },
}
