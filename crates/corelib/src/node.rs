//! Node identity for the consistent hash ring.
//!
//! A physical node is identified by an opaque, case-sensitive string. The ring
//! never interprets it beyond hashing `"<id>#<ordinal>"` for vnode placement.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a physical node.
///
/// Implements `Borrow<str>` so ring-internal sets and maps can be queried
/// with a plain `&str`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Construct a node identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&NodeId> for NodeId {
    fn from(id: &NodeId) -> Self {
        id.clone()
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_node_id_is_case_sensitive() {
        assert_ne!(NodeId::from("node_a"), NodeId::from("Node_A"));
    }

    #[test]
    fn test_node_id_borrow_lookup() {
        let mut nodes = BTreeSet::new();
        nodes.insert(NodeId::from("Node_A"));

        assert!(nodes.contains("Node_A"));
        assert!(!nodes.contains("Node_B"));
    }

    #[test]
    fn test_node_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&NodeId::from("Node_A")).unwrap();
        assert_eq!(json, "\"Node_A\"");
    }
}
