//! Key/value storage partitioned across ring nodes.

use std::collections::BTreeMap;

use corelib::{HashRing, NodeId, Placement, RingTopology};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::migration::{KeyMove, MigrationReport};

/// In-memory key/value store with one map per physical node.
///
/// The store owns its ring so topology changes and data movement happen
/// together. Every entry lives on the node `ring.get_node(key)` names.
///
/// # Example
///
/// ```rust
/// use corelib::HashRing;
/// use keystore::KeyStore;
///
/// let mut store = KeyStore::new(HashRing::new());
/// store.add_node("Node_A").unwrap();
/// store.add_node("Node_B").unwrap();
/// store.put("user:1", "alice").unwrap();
///
/// let report = store.remove_node("Node_A").unwrap();
/// assert_eq!(store.get("user:1"), Some(&"alice"));
/// assert!(report.moved_to("Node_B") <= 1);
/// ```
#[derive(Debug)]
pub struct KeyStore<V> {
    ring: HashRing,
    storage: BTreeMap<NodeId, BTreeMap<String, V>>,
}

impl<V> KeyStore<V> {
    /// Wrap a ring; every node already on it starts with empty storage.
    pub fn new(ring: HashRing) -> Self {
        let storage = ring
            .nodes()
            .into_iter()
            .map(|node| (node, BTreeMap::new()))
            .collect();
        Self { ring, storage }
    }

    /// The routing ring. Not public: topology changes must go through
    /// [`add_node`](Self::add_node) and [`remove_node`](Self::remove_node) so
    /// entries migrate with them.
    ///
    /// ```rust,compile_fail
    /// use corelib::HashRing;
    /// use keystore::KeyStore;
    ///
    /// let store: KeyStore<u32> = KeyStore::new(HashRing::new());
    /// store.ring().add_node("Node_C");
    /// ```
    pub(crate) fn ring(&self) -> &HashRing {
        &self.ring
    }

    /// Owner of each key under the current topology.
    pub fn placement<I, K>(&self, keys: I) -> Placement
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Placement::capture(self.ring(), keys)
    }

    /// Snapshot of the ring for ownership and range queries.
    pub fn topology(&self) -> RingTopology {
        self.ring().topology()
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.storage.contains_key(node)
    }

    /// Add a node and pull in the entries it now owns.
    pub fn add_node(&mut self, node: impl Into<NodeId>) -> Result<MigrationReport, StoreError> {
        let node = node.into();
        if self.storage.contains_key(&node) {
            return Err(StoreError::DuplicateNode(node));
        }
        self.ring.add_node(node.clone());

        let mut report = MigrationReport::default();
        let mut incoming = BTreeMap::new();
        for (holder, entries) in self.storage.iter_mut() {
            let moving: Vec<String> = entries
                .keys()
                .filter(|key| self.ring.get_node(key).as_ref() == Some(&node))
                .cloned()
                .collect();
            for key in moving {
                if let Some(value) = entries.remove(&key) {
                    debug!(%key, from = %holder, to = %node, "moving entry to joining node");
                    report.moves.push(KeyMove {
                        key: key.clone(),
                        from: holder.clone(),
                        to: node.clone(),
                    });
                    incoming.insert(key, value);
                }
            }
        }
        self.storage.insert(node.clone(), incoming);

        info!(%node, moved = report.len(), "node joined store");
        Ok(report)
    }

    /// Remove a node and hand each of its entries to the key's new owner.
    ///
    /// Fails with [`StoreError::UnknownNode`] if the store does not hold the
    /// node, and with [`StoreError::LastNode`] if it is the only node and
    /// still holds entries; the store is unchanged in both cases.
    pub fn remove_node(&mut self, node: &str) -> Result<MigrationReport, StoreError> {
        let held = self
            .storage
            .get(node)
            .map(BTreeMap::len)
            .ok_or_else(|| StoreError::UnknownNode(NodeId::from(node)))?;
        if held > 0 && self.storage.len() == 1 {
            return Err(StoreError::LastNode {
                node: NodeId::from(node),
                entries: held,
            });
        }

        let Some((removed, entries)) = self.storage.remove_entry(node) else {
            return Err(StoreError::UnknownNode(NodeId::from(node)));
        };
        self.ring.remove_node(&removed);

        // Resolve every new owner before any entry moves.
        let mut owners = Vec::with_capacity(entries.len());
        for key in entries.keys() {
            match self.ring.get_node(key) {
                Some(owner) => owners.push(owner),
                None => {
                    self.ring.add_node(removed.clone());
                    self.storage.insert(removed, entries);
                    return Err(StoreError::EmptyRing);
                }
            }
        }

        let mut report = MigrationReport::default();
        for ((key, value), owner) in entries.into_iter().zip(owners) {
            debug!(%key, from = %removed, to = %owner, "moving entry off leaving node");
            report.moves.push(KeyMove {
                key: key.clone(),
                from: removed.clone(),
                to: owner.clone(),
            });
            self.storage.entry(owner).or_default().insert(key, value);
        }

        info!(node = %removed, moved = report.len(), "node left store");
        Ok(report)
    }

    /// Store `value` under `key` on its owning node; returns the owner.
    pub fn put(&mut self, key: impl Into<String>, value: V) -> Result<NodeId, StoreError> {
        let key = key.into();
        let owner = self.ring.get_node(&key).ok_or(StoreError::EmptyRing)?;
        self.storage
            .entry(owner.clone())
            .or_default()
            .insert(key, value);
        Ok(owner)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let owner = self.ring.get_node(key)?;
        self.storage.get(&owner)?.get(key)
    }

    pub fn delete(&mut self, key: &str) -> Option<V> {
        let owner = self.ring.get_node(key)?;
        self.storage.get_mut(&owner)?.remove(key)
    }

    /// Node that currently owns `key`.
    pub fn owner_of(&self, key: &str) -> Option<NodeId> {
        self.ring.get_node(key)
    }

    /// Total number of entries across all nodes.
    pub fn len(&self) -> usize {
        self.storage.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.values().all(BTreeMap::is_empty)
    }

    /// Entries held by `node`, `None` if the store does not hold it.
    pub fn node_len(&self, node: &str) -> Option<usize> {
        self.storage.get(node).map(BTreeMap::len)
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        self.storage.keys().cloned().collect()
    }

    /// Entries held by `node` in key order.
    pub fn entries_on(&self, node: &str) -> Option<impl Iterator<Item = (&str, &V)>> {
        let entries = self.storage.get(node)?;
        Some(entries.iter().map(|(key, value)| (key.as_str(), value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(nodes: &[&str]) -> KeyStore<u32> {
        let mut store = KeyStore::new(HashRing::with_replicas(50).unwrap());
        for node in nodes {
            store.add_node(*node).unwrap();
        }
        store
    }

    #[test]
    fn test_put_on_empty_store_fails() {
        let mut store: KeyStore<u32> = KeyStore::new(HashRing::new());
        assert_eq!(store.put("k", 1), Err(StoreError::EmptyRing));
        assert!(store.get("k").is_none());
    }

    #[test]
    fn test_put_lands_on_owner() {
        let mut store = store(&["Node_A", "Node_B", "Node_C"]);
        let owner = store.put("user:1", 7).unwrap();

        assert_eq!(store.owner_of("user:1"), Some(owner.clone()));
        assert_eq!(store.node_len(owner.as_str()), Some(1));
        assert_eq!(store.get("user:1"), Some(&7));
    }

    #[test]
    fn test_delete() {
        let mut store = store(&["Node_A"]);
        store.put("k", 1).unwrap();

        assert_eq!(store.delete("k"), Some(1));
        assert_eq!(store.delete("k"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_duplicate_and_unknown_nodes() {
        let mut store = store(&["Node_A"]);

        assert_eq!(
            store.add_node("Node_A").unwrap_err(),
            StoreError::DuplicateNode(NodeId::from("Node_A"))
        );
        assert_eq!(
            store.remove_node("Node_Z").unwrap_err(),
            StoreError::UnknownNode(NodeId::from("Node_Z"))
        );
    }

    #[test]
    fn test_last_node_with_data_is_kept() {
        let mut store = store(&["Node_A"]);
        store.put("k", 1).unwrap();

        let err = store.remove_node("Node_A").unwrap_err();
        assert!(matches!(err, StoreError::LastNode { entries: 1, .. }));
        assert_eq!(store.get("k"), Some(&1));
        assert!(store.ring().contains_node("Node_A"));
    }

    #[test]
    fn test_last_empty_node_can_leave() {
        let mut store = store(&["Node_A"]);
        let report = store.remove_node("Node_A").unwrap();

        assert!(report.is_empty());
        assert!(store.ring().is_empty());
        assert!(store.nodes().is_empty());
    }

    #[test]
    fn test_failed_removal_restores_node_and_entries() {
        let mut store = store(&["Node_A", "Node_B"]);
        for i in 0..100 {
            store.put(format!("k{i}"), i).unwrap();
        }
        let held_by_a = store.node_len("Node_A").unwrap();
        // Leave Node_A as the only node on the ring while the store still
        // lists Node_B, so no new owner can be resolved.
        store.ring().remove_node("Node_B");

        assert_eq!(store.remove_node("Node_A"), Err(StoreError::EmptyRing));
        assert_eq!(store.len(), 100);
        assert_eq!(store.node_len("Node_A"), Some(held_by_a));
        assert!(store.ring().contains_node("Node_A"));
        assert!(store.contains_node("Node_A"));
    }

    #[test]
    fn test_read_views_follow_store_topology() {
        let mut store = store(&["Node_A", "Node_B"]);
        store.add_node("Node_C").unwrap();

        let placement = store.placement((0..200).map(|i| format!("k{i}")));
        for (key, owner) in placement.iter() {
            assert_eq!(store.owner_of(key).as_ref(), Some(owner));
        }
        let ownership = store.topology().ownership();
        assert_eq!(ownership.len(), 3);
        assert!(ownership.contains_key("Node_C"));
    }

    #[test]
    fn test_entries_on_node() {
        let mut store = store(&["Node_A"]);
        store.put("b", 2).unwrap();
        store.put("a", 1).unwrap();

        let entries: Vec<_> = store.entries_on("Node_A").unwrap().collect();
        assert_eq!(entries, vec![("a", &1), ("b", &2)]);
        assert!(store.entries_on("Node_B").is_none());
    }
}
