//! CLI subcommands.
//!
//! Each command builds a fresh ring from the resolved [`RingConfig`], drives
//! it through `add_node` / `remove_node` / `get_node`, and returns a report.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{ensure, Context};
use clap::Subcommand;
use corelib::{DistributionStats, HashRing, NodeId, Placement, RingConfig};
use keystore::KeyStore;
use tracing::info;

use crate::report::{DistributionReport, LookupReport, MigrationSummary, SimulationReport};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Measure distribution and relocation when one node joins and one leaves
    Simulate {
        /// Number of deterministic keys (Key0, Key1, ...)
        #[arg(long, default_value_t = 100_000)]
        keys: usize,
        /// Initial nodes
        #[arg(long, value_delimiter = ',', default_values = ["Node_A", "Node_B", "Node_C"])]
        nodes: Vec<String>,
        /// Node to add
        #[arg(long, default_value = "Node_D")]
        add: String,
        /// Node to remove after the add
        #[arg(long, default_value = "Node_A")]
        remove: String,
    },
    /// Report load statistics, then the relocation caused by one more node
    Distribution {
        /// Number of deterministic keys (key_0, key_1, ...)
        #[arg(long, default_value_t = 10_000)]
        keys: usize,
        #[arg(
            long,
            value_delimiter = ',',
            default_values = ["Node_A", "Node_B", "Node_C", "Node_D", "Node_E"]
        )]
        nodes: Vec<String>,
        #[arg(long, default_value = "Node_F")]
        add: String,
    },
    /// Print the owner of each key
    Lookup {
        #[arg(long, value_delimiter = ',', required = true)]
        nodes: Vec<String>,
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Fill a key store, remove a node and show the entries it hands over
    Migrate {
        #[arg(long, default_value_t = 20)]
        keys: usize,
        #[arg(long, value_delimiter = ',', default_values = ["Node_A", "Node_B", "Node_C"])]
        nodes: Vec<String>,
        #[arg(long, default_value = "Node_A")]
        remove: String,
    },
}

/// Result of running a [`Command`].
#[derive(Debug, Clone)]
pub enum CommandResult {
    Simulation(SimulationReport),
    Distribution(DistributionReport),
    Lookup(LookupReport),
    Migration(MigrationSummary),
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Simulation(report) => fmt::Display::fmt(report, f),
            CommandResult::Distribution(report) => fmt::Display::fmt(report, f),
            CommandResult::Lookup(report) => fmt::Display::fmt(report, f),
            CommandResult::Migration(report) => fmt::Display::fmt(report, f),
        }
    }
}

impl Command {
    pub fn execute(&self, config: RingConfig) -> anyhow::Result<CommandResult> {
        match self {
            Command::Simulate {
                keys,
                nodes,
                add,
                remove,
            } => simulate(config, *keys, nodes, add, remove).map(CommandResult::Simulation),
            Command::Distribution { keys, nodes, add } => {
                distribution(config, *keys, nodes, add).map(CommandResult::Distribution)
            }
            Command::Lookup { nodes, keys } => lookup(config, nodes, keys).map(CommandResult::Lookup),
            Command::Migrate {
                keys,
                nodes,
                remove,
            } => migrate(config, *keys, nodes, remove).map(CommandResult::Migration),
        }
    }
}

fn build_ring(config: RingConfig, nodes: &[String]) -> anyhow::Result<HashRing> {
    ensure!(!nodes.is_empty(), "at least one node is required");
    let ring = HashRing::from_config(config).context("invalid ring configuration")?;
    for node in nodes {
        ensure!(ring.add_node(node.as_str()), "node {node} listed twice");
    }
    Ok(ring)
}

fn simulate(
    config: RingConfig,
    keys: usize,
    nodes: &[String],
    add: &str,
    remove: &str,
) -> anyhow::Result<SimulationReport> {
    let ring = build_ring(config, nodes)?;
    ensure!(!ring.contains_node(add), "node {add} is already on the ring");
    let keys: Vec<String> = (0..keys).map(|i| format!("Key{i}")).collect();

    let initial = Placement::capture(&ring, keys.iter().cloned());
    let ideal_add_fraction = 1.0 / (nodes.len() as f64 + 1.0);

    ring.add_node(add);
    let after_add = Placement::capture(&ring, keys.iter().cloned());
    let add_relocation = initial.relocations(&after_add);
    info!(node = add, moved = add_relocation.moved, "simulated node addition");

    ensure!(ring.contains_node(remove), "node {remove} is not on the ring");
    ring.remove_node(remove);
    let after_remove = Placement::capture(&ring, keys.iter().cloned());
    let remove_relocation = after_add.relocations(&after_remove);
    info!(node = remove, moved = remove_relocation.moved, "simulated node removal");

    Ok(SimulationReport {
        replicas: config.replicas,
        keys: keys.len(),
        initial: initial.distribution(),
        added: NodeId::from(add),
        after_add: after_add.distribution(),
        add_relocation,
        ideal_add_fraction,
        removed: NodeId::from(remove),
        after_remove: after_remove.distribution(),
        remove_relocation,
        collision_probability: config.collision_probability(nodes.len() + 1),
    })
}

fn distribution(
    config: RingConfig,
    keys: usize,
    nodes: &[String],
    add: &str,
) -> anyhow::Result<DistributionReport> {
    let ring = build_ring(config, nodes)?;
    ensure!(!ring.contains_node(add), "node {add} is already on the ring");
    let keys: Vec<String> = (0..keys).map(|i| format!("key_{i}")).collect();

    let before = Placement::capture(&ring, keys.iter().cloned());
    let before_stats = DistributionStats::from_counts(&before.distribution())
        .context("no keys to distribute")?;

    ring.add_node(add);
    let after = Placement::capture(&ring, keys.iter().cloned());
    let after_stats =
        DistributionStats::from_counts(&after.distribution()).context("no keys to distribute")?;

    Ok(DistributionReport {
        replicas: config.replicas,
        keys: keys.len(),
        before: before_stats,
        added: NodeId::from(add),
        relocation: before.relocations(&after),
        ideal_fraction: 1.0 / (nodes.len() as f64 + 1.0),
        after: after_stats,
    })
}

fn lookup(config: RingConfig, nodes: &[String], keys: &[String]) -> anyhow::Result<LookupReport> {
    let ring = build_ring(config, nodes)?;
    let entries = keys
        .iter()
        .map(|key| (key.clone(), ring.position_of(key), ring.get_node(key)))
        .collect();
    Ok(LookupReport { entries })
}

fn migrate(
    config: RingConfig,
    keys: usize,
    nodes: &[String],
    remove: &str,
) -> anyhow::Result<MigrationSummary> {
    let mut store = KeyStore::new(build_ring(config, nodes)?);
    for i in 0..keys {
        store.put(format!("user_{i}"), format!("value_{i}"))?;
    }
    let counts = |store: &KeyStore<String>| -> BTreeMap<NodeId, usize> {
        store
            .nodes()
            .into_iter()
            .map(|node| {
                let held = store.node_len(node.as_str()).unwrap_or(0);
                (node, held)
            })
            .collect()
    };

    let before = counts(&store);
    let migration = store.remove_node(remove)?;
    let after = counts(&store);

    Ok(MigrationSummary {
        removed: NodeId::from(remove),
        before,
        after,
        migration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(nodes: &[&str]) -> Vec<String> {
        nodes.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_simulate_moves_keys_onto_new_node() {
        let report = simulate(
            RingConfig::default(),
            10_000,
            &names(&["Node_A", "Node_B", "Node_C"]),
            "Node_D",
            "Node_A",
        )
        .unwrap();

        assert_eq!(report.add_relocation.moved_to("Node_D"), report.add_relocation.moved);
        assert_eq!(report.remove_relocation.moved_from("Node_A"), report.remove_relocation.moved);
        assert!(!report.after_remove.contains_key("Node_A"));
        assert!((report.ideal_add_fraction - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_simulate_rejects_unknown_removal() {
        let err = simulate(RingConfig::default(), 10, &names(&["Node_A"]), "Node_D", "Node_Z");
        assert!(err.is_err());
    }

    #[test]
    fn test_duplicate_nodes_rejected() {
        assert!(build_ring(RingConfig::default(), &names(&["A", "A"])).is_err());
        assert!(build_ring(RingConfig::default(), &[]).is_err());
    }

    #[test]
    fn test_lookup_single_node() {
        let report = lookup(RingConfig::new(4), &names(&["only"]), &names(&["k1", "k2"])).unwrap();
        assert!(report
            .entries
            .iter()
            .all(|(_, _, owner)| owner.as_ref().is_some_and(|n| n == "only")));
    }

    #[test]
    fn test_migrate_keeps_every_entry() {
        let summary = migrate(
            RingConfig::default(),
            200,
            &names(&["Node_A", "Node_B", "Node_C"]),
            "Node_A",
        )
        .unwrap();

        assert_eq!(summary.before.values().sum::<usize>(), 200);
        assert_eq!(summary.after.values().sum::<usize>(), 200);
        assert_eq!(summary.migration.len(), summary.before[&NodeId::from("Node_A")]);
    }
}
