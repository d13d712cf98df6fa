//! Migration reports.

use corelib::NodeId;

/// One entry handed from one node to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMove {
    pub key: String,
    pub from: NodeId,
    pub to: NodeId,
}

/// Entries moved by one topology change, in the order they were moved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub moves: Vec<KeyMove>,
}

impl MigrationReport {
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Entries that arrived on `node`.
    pub fn moved_to(&self, node: &str) -> usize {
        self.moves.iter().filter(|m| m.to.as_str() == node).count()
    }

    /// Entries that left `node`.
    pub fn moved_from(&self, node: &str) -> usize {
        self.moves.iter().filter(|m| m.from.as_str() == node).count()
    }
}
