use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashMap;
use parking_lot::RwLock;

/// Breakpoints keyed by source name and 1-based line.
///
/// One registry is meant to be shared (through `Arc`) by the host thread
/// that sets breakpoints and every thread that evaluates with debug
/// sessions. Lookups take a read lock; registration takes a write lock.
/// Breakpoints persist until they are cleared.
#[derive(Debug, Default)]
pub struct BreakpointRegistry {
    breakpoints: RwLock<HashMap<String, BTreeSet<u32>>>,
}

impl BreakpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a breakpoint. Returns `false` if it was already registered.
    pub fn register(&self, source_name: &str, line: u32) -> bool {
        let added = self
            .breakpoints
            .write()
            .entry(source_name.to_string())
            .or_default()
            .insert(line);
        tracing::debug!(source_name, line, added, "register breakpoint");
        added
    }

    /// Remove a breakpoint. Returns `false` if it was not registered.
    pub fn clear(&self, source_name: &str, line: u32) -> bool {
        let mut breakpoints = self.breakpoints.write();
        let Some(lines) = breakpoints.get_mut(source_name) else {
            return false;
        };
        let removed = lines.remove(&line);
        if lines.is_empty() {
            breakpoints.remove(source_name);
        }
        tracing::debug!(source_name, line, removed, "clear breakpoint");
        removed
    }

    /// Remove every breakpoint of one source.
    pub fn clear_source(&self, source_name: &str) {
        self.breakpoints.write().remove(source_name);
        tracing::debug!(source_name, "clear source breakpoints");
    }

    pub fn clear_all(&self) {
        self.breakpoints.write().clear();
        tracing::debug!("clear all breakpoints");
    }

    pub fn is_registered(&self, source_name: &str, line: u32) -> bool {
        self.breakpoints
            .read()
            .get(source_name)
            .is_some_and(|lines| lines.contains(&line))
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.read().is_empty()
    }

    /// Registered lines of one source, in ascending order.
    pub fn lines(&self, source_name: &str) -> Vec<u32> {
        self.breakpoints
            .read()
            .get(source_name)
            .map(|lines| lines.iter().copied().collect())
            .unwrap_or_default()
    }
}
