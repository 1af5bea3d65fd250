//! Remaining-cost estimates used to order the search frontier.
//!
//! A heuristic must be *admissible* (never overestimate the true remaining
//! road distance) for the search to return shortest routes. Nothing checks
//! this at runtime: an inadmissible estimate still produces a valid route,
//! just not necessarily the shortest one.

use crate::model::{NodeId, RouteModel};

/// Estimate of the remaining cost from a node to the goal.
pub trait Heuristic {
    fn estimate<M: RouteModel + ?Sized>(&self, model: &M, node: NodeId, goal: NodeId) -> f64;
}

/// Straight-line distance to the goal. Admissible whenever edge weights are
/// at least the Euclidean distance between their endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLine;

impl Heuristic for StraightLine {
    fn estimate<M: RouteModel + ?Sized>(&self, model: &M, node: NodeId, goal: NodeId) -> f64 {
        model.distance(node, goal)
    }
}

/// Constant zero estimate; the search degrades to Dijkstra's algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn estimate<M: RouteModel + ?Sized>(&self, _model: &M, _node: NodeId, _goal: NodeId) -> f64 {
        0.0
    }
}
