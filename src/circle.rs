use std::collections::HashMap;

use tracing::debug;

use crate::hasher;
use crate::registry::Registry;

/// Average number of replicas generated per node; a node's share is scaled by
/// its weight relative to the mean.
pub const REPLICA_FACTOR: u128 = 40;

/// An immutable, fully generated hash circle.
///
/// `points` holds every generated point in ascending order, repeats included.
/// `owners` maps each distinct point to the node that claimed it last.
#[derive(Debug, Clone, Default)]
pub struct Circle {
    nodes: Vec<String>,
    owners: HashMap<u32, usize>,
    points: Vec<u32>,
    distinct_nodes: usize,
}

impl Circle {
    /// Generates the circle for the current contents of `registry`.
    pub fn build(registry: &Registry) -> Self {
        if registry.is_empty() {
            return Self::default();
        }

        let node_count = registry.len() as u128;
        let total_weight = registry.total_weight();

        let mut nodes = Vec::with_capacity(registry.len());
        let mut owners = HashMap::new();
        let mut points = Vec::new();

        for (idx, node) in registry.iter().enumerate() {
            nodes.push(node.id.clone());

            let replicas = (REPLICA_FACTOR * node_count * node.weight as u128 / total_weight) as u64;
            for replica in 0..replicas {
                for point in hasher::replica_points(&node.id, replica) {
                    owners.insert(point, idx);
                    points.push(point);
                }
            }
        }

        points.sort_unstable();

        let mut claimed = vec![false; nodes.len()];
        for &idx in owners.values() {
            claimed[idx] = true;
        }
        let distinct_nodes = claimed.iter().filter(|&&c| c).count();

        debug!(
            nodes = nodes.len(),
            points = points.len(),
            distinct_points = owners.len(),
            distinct_nodes,
            "Generated hash circle"
        );

        Self {
            nodes,
            owners,
            points,
            distinct_nodes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All generated points, ascending.
    pub fn points(&self) -> &[u32] {
        &self.points
    }

    /// Number of nodes that own at least one point.
    pub fn distinct_nodes(&self) -> usize {
        self.distinct_nodes
    }

    /// The node bound to exactly `point`, if any replica landed there.
    pub fn owner(&self, point: u32) -> Option<&str> {
        self.owners.get(&point).map(|&idx| self.nodes[idx].as_str())
    }

    /// Index into [`Circle::points`] of the first point strictly after the
    /// key's point, wrapping to 0 past the end. `None` on an empty circle.
    pub fn position(&self, key: &str) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let point = hasher::query_point(key);
        let pos = self.points.partition_point(|&p| p <= point);
        if pos == self.points.len() { Some(0) } else { Some(pos) }
    }

    /// The node owning `key`, or an empty string when the circle is empty.
    pub fn get_node(&self, key: &str) -> String {
        self.position(key)
            .and_then(|pos| self.owner_index(pos))
            .map(|idx| self.nodes[idx].clone())
            .unwrap_or_default()
    }

    /// Up to `size` distinct nodes for `key`, in ring order starting from the
    /// key's owner.
    ///
    /// Returns an empty list when the circle is empty or when `size` exceeds
    /// the number of registered nodes. The walk covers the circle at most once,
    /// so a node weighted down to zero replicas shortens the result, and
    /// `size == 0` never stops early and yields every node on the circle.
    pub fn get_nodes(&self, key: &str, size: usize) -> Vec<String> {
        let Some(pos) = self.position(key) else {
            return Vec::new();
        };
        if size > self.nodes.len() {
            return Vec::new();
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut result = Vec::with_capacity(size);
        for step in 0..self.points.len() {
            let Some(idx) = self.owner_index((pos + step) % self.points.len()) else {
                continue;
            };
            if !seen[idx] {
                seen[idx] = true;
                result.push(self.nodes[idx].clone());
            }
            if result.len() == size {
                break;
            }
        }
        result
    }

    fn owner_index(&self, pos: usize) -> Option<usize> {
        self.owners.get(&self.points[pos]).copied()
    }
}
