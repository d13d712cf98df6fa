//! Key placement snapshots.
//!
//! Consistent hashing is judged by what happens to keys when the topology
//! changes. A [`Placement`] records which node owns each key at one moment;
//! comparing two placements yields a [`Relocation`] report.

use std::collections::BTreeMap;

use crate::node::NodeId;
use crate::partitioner::Partitioner;
use crate::ring::HashRing;

/// Owner of every captured key at one point in time.
///
/// Keys are only recorded when the ring had an owner for them, so a capture
/// from an empty ring is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    owners: BTreeMap<String, NodeId>,
}

impl Placement {
    /// Resolve `keys` against `ring` under a single read lock.
    pub fn capture<P, I, K>(ring: &HashRing<P>, keys: I) -> Self
    where
        P: Partitioner,
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let owners = ring.get_nodes(keys.iter().map(String::as_str));
        let owners = keys
            .into_iter()
            .zip(owners)
            .filter_map(|(key, owner)| owner.map(|owner| (key, owner)))
            .collect();
        Self { owners }
    }

    pub fn owner(&self, key: &str) -> Option<&NodeId> {
        self.owners.get(key)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeId)> {
        self.owners.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Number of keys per owning node.
    pub fn distribution(&self) -> BTreeMap<NodeId, usize> {
        let mut counts = BTreeMap::new();
        for node in self.owners.values() {
            *counts.entry(node.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Keys whose owner differs between `self` and `after`.
    ///
    /// Only keys present in both snapshots are compared.
    pub fn relocations(&self, after: &Placement) -> Relocation {
        let mut relocation = Relocation {
            total: self.owners.len(),
            ..Relocation::default()
        };
        for (key, before) in &self.owners {
            let Some(now) = after.owners.get(key) else {
                continue;
            };
            if now != before {
                relocation.moved += 1;
                *relocation
                    .flows
                    .entry((before.clone(), now.clone()))
                    .or_insert(0) += 1;
            }
        }
        relocation
    }
}

/// Keys that changed owner between two placements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relocation {
    /// Keys in the earlier placement.
    pub total: usize,
    /// Keys whose owner changed.
    pub moved: usize,
    /// Moved-key counts per `(from, to)` pair.
    pub flows: BTreeMap<(NodeId, NodeId), usize>,
}

impl Relocation {
    /// Fraction of keys moved, 0.0 for an empty placement.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.moved as f64 / self.total as f64
        }
    }

    pub fn moved_to(&self, node: &str) -> usize {
        self.flows
            .iter()
            .filter(|((_, to), _)| to.as_str() == node)
            .map(|(_, count)| count)
            .sum()
    }

    pub fn moved_from(&self, node: &str) -> usize {
        self.flows
            .iter()
            .filter(|((from, _), _)| from.as_str() == node)
            .map(|(_, count)| count)
            .sum()
    }
}

/// Summary statistics of a per-node load distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionStats {
    pub nodes: usize,
    pub total: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); 0.0 for a single node.
    pub std_dev: f64,
    pub min: usize,
    pub max: usize,
}

impl DistributionStats {
    /// Statistics over per-node counts, `None` when there are no nodes.
    pub fn from_counts(counts: &BTreeMap<NodeId, usize>) -> Option<Self> {
        let min = *counts.values().min()?;
        let max = *counts.values().max()?;
        let nodes = counts.len();
        let total: usize = counts.values().sum();
        let mean = total as f64 / nodes as f64;
        let std_dev = if nodes < 2 {
            0.0
        } else {
            let squares: f64 = counts
                .values()
                .map(|&count| (count as f64 - mean).powi(2))
                .sum();
            (squares / (nodes - 1) as f64).sqrt()
        };
        Some(Self {
            nodes,
            total,
            mean,
            std_dev,
            min,
            max,
        })
    }

    /// Standard deviation as a fraction of the mean.
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.std_dev / self.mean
        }
    }
}
