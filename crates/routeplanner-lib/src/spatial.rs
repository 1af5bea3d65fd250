//! KD-tree spatial index for nearest-node queries.
//!
//! Route endpoints arrive as arbitrary map positions and must be snapped onto
//! the road network before a search can start. The [`NodeIndex`] wraps a 2-D
//! KD-tree over every node position, giving O(log n) average-case lookups.
//!
//! Equidistant candidates are resolved to the smallest [`NodeId`] so endpoint
//! resolution is reproducible regardless of tree layout. Nodes sharing an
//! exact position are stored once, under the smallest id among them.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::info;

use crate::model::{NodeId, RouteNode};

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Relative padding applied when collecting equidistant candidates.
const TIE_EPSILON: f64 = 1e-12;

/// Static nearest-node index over a road graph's node positions.
pub struct NodeIndex {
    tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32>,
    /// Representative node id per distinct position, indexed by tree item.
    ids: Vec<NodeId>,
    node_count: usize,
}

impl NodeIndex {
    /// Build an index over the given nodes.
    ///
    /// Coincident nodes collapse into a single tree entry, so any number of
    /// nodes may share a position.
    pub fn build(nodes: &[RouteNode]) -> Self {
        let mut tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32> = KdTree::new();
        let mut ids: Vec<NodeId> = Vec::with_capacity(nodes.len());
        let mut slots: HashMap<[u64; 2], usize> = HashMap::with_capacity(nodes.len());

        for node in nodes {
            match slots.entry(position_key(node)) {
                Entry::Occupied(slot) => {
                    let id = &mut ids[*slot.get()];
                    *id = (*id).min(node.id);
                }
                Entry::Vacant(slot) => {
                    let item = ids.len();
                    tree.add(&[node.x, node.y], item);
                    ids.push(node.id);
                    slot.insert(item);
                }
            }
        }

        info!(
            node_count = nodes.len(),
            positions = ids.len(),
            "built node index"
        );

        Self {
            tree,
            ids,
            node_count: nodes.len(),
        }
    }

    /// Number of indexed nodes, counting coincident nodes separately.
    pub fn len(&self) -> usize {
        self.node_count
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Number of distinct positions held by the tree.
    pub fn position_count(&self) -> usize {
        self.ids.len()
    }

    /// Find the node closest to `point`.
    ///
    /// Returns the node id and its Euclidean distance, or `None` when the
    /// index is empty.
    pub fn nearest(&self, point: [f64; 2]) -> Option<(NodeId, f64)> {
        if self.ids.is_empty() {
            return None;
        }

        let best = self.tree.nearest_one::<SquaredEuclidean>(&point);
        let best_distance = best.distance;

        // Gather every node sharing the best distance and keep the lowest id.
        // The search radius is padded so ties survive a strict comparison.
        let radius = best_distance + best_distance.max(1.0) * TIE_EPSILON;
        let mut candidates = self
            .tree
            .within_unsorted::<SquaredEuclidean>(&point, radius);
        candidates.push(best);

        candidates
            .into_iter()
            .filter(|candidate| candidate.distance <= best_distance)
            .map(|candidate| (self.ids[candidate.item], candidate.distance))
            .min_by(|a, b| compare_candidates(*a, *b))
            .map(|(id, squared)| (id, squared.sqrt()))
    }
}

/// Bit pattern of a node position; `-0.0` and `0.0` map to the same key.
fn position_key(node: &RouteNode) -> [u64; 2] {
    [(node.x + 0.0).to_bits(), (node.y + 0.0).to_bits()]
}

fn compare_candidates(a: (NodeId, f64), b: (NodeId, f64)) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0))
}

impl std::fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeIndex")
            .field("len", &self.node_count)
            .field("positions", &self.ids.len())
            .finish()
    }
}
