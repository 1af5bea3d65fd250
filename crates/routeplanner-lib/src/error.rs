use thiserror::Error;

use crate::model::NodeId;

/// Convenient result alias for the route planner library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a search is requested against a graph without any nodes.
    #[error("road graph contains no nodes; cannot resolve route endpoints")]
    EmptyGraph,

    /// Raised when an endpoint percentage is not a finite value in `0..=100`.
    #[error("{axis} coordinate {value} is outside the map extent (expected 0-100 percent)")]
    CoordinateOutOfRange { axis: Axis, value: f64 },

    /// Raised when a node is added with non-finite coordinates.
    #[error("node {id} has a non-finite position")]
    InvalidNodePosition { id: NodeId },

    /// Raised when a road or lookup references a node that does not exist.
    #[error("unknown node id: {id}")]
    UnknownNode { id: NodeId },

    /// Raised when the metric scale is zero, negative, or not finite.
    #[error("metric scale must be finite and positive, got {value}")]
    InvalidMetricScale { value: f64 },

    /// Raised when no route could be found between two nodes.
    #[error("no route found between node {start} and node {goal}")]
    RouteNotFound { start: NodeId, goal: NodeId },

    /// Raised when a search observed its cancellation token.
    #[error("route search cancelled after {expanded} expansions")]
    SearchCancelled { expanded: usize },

    /// Wrapper for JSON request parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Map axis named in coordinate errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}
