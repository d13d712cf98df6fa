//! Migration behaviour of the key store across topology changes.

use corelib::{HashRing, NodeId};
use keystore::KeyStore;

fn filled_store(nodes: &[&str], keys: usize) -> KeyStore<usize> {
    let mut store = KeyStore::new(HashRing::new());
    for node in nodes {
        store.add_node(*node).unwrap();
    }
    for i in 0..keys {
        store.put(format!("Key{i}"), i).unwrap();
    }
    store
}

#[test]
fn removal_migrates_every_entry_of_the_leaving_node() {
    let mut store = filled_store(&["Node_A", "Node_B", "Node_C"], 5_000);
    let held_by_a = store.node_len("Node_A").unwrap();

    let report = store.remove_node("Node_A").unwrap();

    assert_eq!(report.len(), held_by_a);
    assert_eq!(report.moved_from("Node_A"), held_by_a);
    assert_eq!(report.moved_to("Node_B") + report.moved_to("Node_C"), held_by_a);
    assert_eq!(store.len(), 5_000);
    assert_eq!(store.node_len("Node_A"), None);

    for i in 0..5_000 {
        assert_eq!(store.get(&format!("Key{i}")), Some(&i), "Key{i} lost");
    }
}

#[test]
fn removal_leaves_other_nodes_entries_in_place() {
    let mut store = filled_store(&["Node_A", "Node_B", "Node_C", "Node_D"], 2_000);
    let keys: Vec<String> = (0..2_000).map(|i| format!("Key{i}")).collect();
    let before = store.placement(keys.iter().cloned());

    let report = store.remove_node("Node_B").unwrap();

    for moved in &report.moves {
        assert_eq!(moved.from, "Node_B");
        assert_eq!(before.owner(&moved.key), Some(&NodeId::from("Node_B")));
    }
    for (key, owner) in before.iter() {
        if owner != "Node_B" {
            assert_eq!(store.owner_of(key).as_ref(), Some(owner));
        }
    }
}

#[test]
fn joining_node_pulls_only_the_keys_it_now_owns() {
    let mut store = filled_store(&["Node_A", "Node_B", "Node_C"], 5_000);

    let report = store.add_node("Node_D").unwrap();

    assert_eq!(report.moved_to("Node_D"), report.len());
    assert_eq!(store.node_len("Node_D"), Some(report.len()));
    // Roughly a quarter of the keys: 1/(N+1) with N = 3.
    let fraction = report.len() as f64 / 5_000.0;
    assert!((0.125..=0.375).contains(&fraction), "moved {fraction:.4}");

    for i in 0..5_000 {
        assert_eq!(store.get(&format!("Key{i}")), Some(&i));
    }
}

#[test]
fn every_entry_lives_on_its_owner_after_churn() {
    let mut store = filled_store(&["Node_A", "Node_B"], 1_000);
    store.add_node("Node_C").unwrap();
    store.remove_node("Node_A").unwrap();
    store.add_node("Node_A").unwrap();
    store.remove_node("Node_B").unwrap();

    for node in store.nodes() {
        for (key, _) in store.entries_on(node.as_str()).unwrap() {
            assert_eq!(store.owner_of(key).as_ref(), Some(&node));
        }
    }
    assert_eq!(store.len(), 1_000);
}
