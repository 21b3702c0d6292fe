//! Load introspection types.

use crate::node::{Node, NodeSnapshot};

/// Aggregate load statistics for a ring.
#[derive(Debug, Clone)]
pub struct Stats {
    /// Number of live nodes.
    pub node_count: usize,
    /// Number of entries on the ring (stale ones included until the next rebuild).
    pub virtual_node_count: usize,
    /// Sum of loads in the current batch.
    pub total_load: usize,
    /// Sum of load bounds in the current batch.
    pub total_capacity: usize,
    /// Largest `load / max_load` over nodes with a non-zero bound. Never above
    /// 1.0 after a well-formed batch.
    pub max_utilization: f64,
    /// Per-node snapshots, sorted by id.
    pub nodes: Vec<NodeSnapshot>,
}

impl Stats {
    pub(crate) fn collect<'a>(
        nodes: impl Iterator<Item = &'a Node>,
        virtual_node_count: usize,
    ) -> Self {
        let mut nodes: Vec<NodeSnapshot> = nodes.map(Node::snapshot).collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let total_load = nodes.iter().map(|n| n.load).sum();
        let total_capacity = nodes.iter().map(|n| n.max_load).sum();
        let max_utilization = nodes
            .iter()
            .filter(|n| n.max_load > 0)
            .map(|n| n.load as f64 / n.max_load as f64)
            .fold(0.0, f64::max);

        Self {
            node_count: nodes.len(),
            virtual_node_count,
            total_load,
            total_capacity,
            max_utilization,
            nodes,
        }
    }
}
