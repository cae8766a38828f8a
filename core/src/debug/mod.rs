//! Breakpoints and stepping over compiled programs.
//!
//! A program compiled with debug symbols carries a source location on the
//! root node of every statement and on each node that starts a new line. A
//! [`DebugSession`] suspends before any located node whose line is
//! registered in a [`BreakpointRegistry`] (or before every located node
//! while stepping), in the middle of a statement if need be. Evaluations
//! that do not go through a session never look at the registry.

mod registry;
mod session;


pub use registry::BreakpointRegistry;
pub use session::{DebugSession, DebugStep, Debugger, Directive, Frame};
