//! Expression nodes and their construction.

mod binary;
pub mod error;
mod node;

pub use binary::BuildContext;
pub use error::{BuildError, Side};
pub use node::{BinaryNode, Node, NodeArena, NodeId};
