//! Human-readable reports printed by the CLI.

use std::collections::BTreeMap;
use std::fmt;

use corelib::{DistributionStats, NodeId, Relocation, RingPosition};
use keystore::MigrationReport;

/// Outcome of the add-one / remove-one scenario.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub replicas: usize,
    pub keys: usize,
    pub initial: BTreeMap<NodeId, usize>,
    pub added: NodeId,
    pub after_add: BTreeMap<NodeId, usize>,
    pub add_relocation: Relocation,
    /// 1/(N+1) for the N nodes present before the add.
    pub ideal_add_fraction: f64,
    pub removed: NodeId,
    pub after_remove: BTreeMap<NodeId, usize>,
    pub remove_relocation: Relocation,
    /// Birthday-bound chance of any vnode collision at the peak node count.
    pub collision_probability: f64,
}

/// Load statistics for a ring and the effect of growing it by one node.
#[derive(Debug, Clone)]
pub struct DistributionReport {
    pub replicas: usize,
    pub keys: usize,
    pub before: DistributionStats,
    pub added: NodeId,
    pub relocation: Relocation,
    pub ideal_fraction: f64,
    pub after: DistributionStats,
}

/// Owner of each requested key.
#[derive(Debug, Clone)]
pub struct LookupReport {
    pub entries: Vec<(String, RingPosition, Option<NodeId>)>,
}

/// Key store demonstration: entries per node around one removal.
#[derive(Debug, Clone)]
pub struct MigrationSummary {
    pub removed: NodeId,
    pub before: BTreeMap<NodeId, usize>,
    pub after: BTreeMap<NodeId, usize>,
    pub migration: MigrationReport,
}

fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

fn write_distribution(
    f: &mut fmt::Formatter<'_>,
    counts: &BTreeMap<NodeId, usize>,
    total: usize,
) -> fmt::Result {
    for (node, count) in counts {
        let share = if total == 0 { 0.0 } else { *count as f64 / total as f64 };
        writeln!(f, "     {node}: {count} keys ({})", percent(share))?;
    }
    Ok(())
}

fn write_stats(f: &mut fmt::Formatter<'_>, stats: &DistributionStats) -> fmt::Result {
    writeln!(f, "  - Nodes: {}", stats.nodes)?;
    writeln!(f, "  - Mean Keys per Node: {:.2}", stats.mean)?;
    writeln!(
        f,
        "  - Std Dev: {:.2} ({})",
        stats.std_dev,
        percent(stats.coefficient_of_variation())
    )?;
    writeln!(f, "  - Max Node: {}", stats.max)?;
    writeln!(f, "  - Min Node: {}", stats.min)
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Consistent Hashing Simulation ---")?;
        writeln!(
            f,
            "1. Initial State: {} Nodes, {} vnodes/node",
            self.initial.len(),
            self.replicas
        )?;
        writeln!(f, "   Total Keys: {}", self.keys)?;
        writeln!(f, "   Load Distribution:")?;
        write_distribution(f, &self.initial, self.keys)?;

        writeln!(f)?;
        writeln!(f, "2. Adding {}...", self.added)?;
        writeln!(f, "   Load Distribution After Add:")?;
        write_distribution(f, &self.after_add, self.keys)?;
        writeln!(
            f,
            "   Keys Moved: {} ({})",
            self.add_relocation.moved,
            percent(self.add_relocation.fraction())
        )?;
        writeln!(
            f,
            "   Moved onto {}: {}",
            self.added,
            self.add_relocation.moved_to(self.added.as_str())
        )?;
        writeln!(
            f,
            "   Theoretical Ideal Movement: {}",
            percent(self.ideal_add_fraction)
        )?;

        writeln!(f)?;
        writeln!(f, "3. Removing {}...", self.removed)?;
        writeln!(f, "   Load Distribution After Removal:")?;
        write_distribution(f, &self.after_remove, self.keys)?;
        writeln!(
            f,
            "   Keys Moved: {} ({})",
            self.remove_relocation.moved,
            percent(self.remove_relocation.fraction())
        )?;
        writeln!(
            f,
            "   Moved off {}: {}",
            self.removed,
            self.remove_relocation.moved_from(self.removed.as_str())
        )?;

        writeln!(f)?;
        write!(
            f,
            "Vnode collision probability (birthday bound): {:.3e}",
            self.collision_probability
        )
    }
}

impl fmt::Display for DistributionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== TEST 1: Initial Distribution (vNodes={}) ===",
            self.replicas
        )?;
        write_stats(f, &self.before)?;

        writeln!(f)?;
        writeln!(f, "=== TEST 2: Node Addition (Rebalancing) ===")?;
        writeln!(f, ">>> Adding '{}'...", self.added)?;
        writeln!(f, "  - Total Keys: {}", self.keys)?;
        writeln!(f, "  - Keys Moved: {}", self.relocation.moved)?;
        writeln!(f, "  - Percent Moved: {}", percent(self.relocation.fraction()))?;
        writeln!(f, "  - Ideal Movement: {}", percent(self.ideal_fraction))?;

        writeln!(f)?;
        writeln!(f, "=== TEST 3: New Distribution After Add ===")?;
        write_stats(f, &self.after)
    }
}

impl fmt::Display for LookupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, position, owner)) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match owner {
                Some(node) => write!(f, "{key} @ {position} -> {node}")?,
                None => write!(f, "{key} @ {position} -> (no owner)")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for MigrationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total: usize = self.before.values().sum();
        writeln!(f, "Entries before removing {}:", self.removed)?;
        write_distribution(f, &self.before, total)?;
        writeln!(f, "Removing {}...", self.removed)?;
        for moved in &self.migration.moves {
            writeln!(f, "  -> Moved '{}' from {} to {}", moved.key, moved.from, moved.to)?;
        }
        writeln!(f, "Entries after removal:")?;
        write_distribution(f, &self.after, total)?;
        write!(f, "Moved {} of {} entries", self.migration.len(), total)
    }
}
