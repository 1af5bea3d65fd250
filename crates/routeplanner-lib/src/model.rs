//! Graph model contract consumed by the route search.
//!
//! The search never owns nodes. It asks a [`RouteModel`] for node positions,
//! nearest-node lookups, neighbour discovery, and pairwise distances, and keeps
//! all per-search bookkeeping in its own side tables keyed by [`NodeId`]. This
//! lets any number of searches share one model concurrently.

use serde::Serialize;

use crate::error::Result;

/// Stable node identifier within a road graph.
pub type NodeId = usize;

/// Value snapshot of a graph node in normalized map units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteNode {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

impl RouteNode {
    /// Calculate the Euclidean distance to another node.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Read-only view of a road network used by the route search.
pub trait RouteModel {
    /// Number of nodes in the graph.
    fn node_count(&self) -> usize;

    /// Snapshot of a node, or `None` when the id is unknown.
    fn node(&self, id: NodeId) -> Option<RouteNode>;

    /// Resolve the node closest to a point in normalized map units.
    ///
    /// Fails with [`Error::EmptyGraph`](crate::Error::EmptyGraph) when the
    /// graph has no nodes.
    fn find_nearest_node(&self, x: f64, y: f64) -> Result<NodeId>;

    /// Adjacent nodes of `id`, discovered on first request and memoized.
    ///
    /// Must be idempotent and return neighbours in a stable order.
    fn neighbours(&self, id: NodeId) -> &[NodeId];

    /// Symmetric, non-negative distance between two nodes in graph units.
    fn distance(&self, a: NodeId, b: NodeId) -> f64 {
        match (self.node(a), self.node(b)) {
            (Some(a), Some(b)) => a.distance_to(&b),
            _ => f64::INFINITY,
        }
    }

    /// Factor converting graph-unit distances into real-world units (metres).
    fn metric_scale(&self) -> f64;
}

/// Receiver for a computed route, typically the model backing a renderer.
pub trait PathSink {
    fn receive_path(&mut self, path: Vec<RouteNode>);
}
