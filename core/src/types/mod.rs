pub mod manager;
pub mod tag;
mod types;

#[cfg(test)]
mod manager_test;


pub use tag::{OperandType, TypeTag, resolve_operand_tag, result_type};
pub use types::{ClassType, Primitive, Type};
