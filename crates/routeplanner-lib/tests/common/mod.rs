// Shared fixtures for `routeplanner-lib` integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Once;

use routeplanner_lib::{
    Error, NodeId, RoadGraph, RouteModel, RouteNode, RoutePath, Result as RouteResult,
};

static TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber once per test binary.
///
/// Log output is controlled with `RUST_LOG`; nothing is printed by default.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Route model with explicit edge weights, independent of node positions.
///
/// Positions only drive nearest-node lookup and the heuristic, so fixtures
/// must keep every weight at least the straight-line distance between its
/// endpoints.
pub struct WeightedGraph {
    nodes: Vec<RouteNode>,
    adjacency: Vec<Vec<NodeId>>,
    weights: HashMap<(NodeId, NodeId), f64>,
    metric_scale: f64,
}

impl WeightedGraph {
    pub fn new(positions: &[(f64, f64)], metric_scale: f64) -> Self {
        let nodes = positions
            .iter()
            .enumerate()
            .map(|(id, &(x, y))| RouteNode { id, x, y })
            .collect::<Vec<_>>();
        let adjacency = vec![Vec::new(); nodes.len()];
        Self {
            nodes,
            adjacency,
            weights: HashMap::new(),
            metric_scale,
        }
    }

    pub fn connect(mut self, a: NodeId, b: NodeId, weight: f64) -> Self {
        self.adjacency[a].push(b);
        self.adjacency[b].push(a);
        self.weights.insert((a.min(b), a.max(b)), weight);
        self
    }
}

impl RouteModel for WeightedGraph {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, id: NodeId) -> Option<RouteNode> {
        self.nodes.get(id).copied()
    }

    fn find_nearest_node(&self, x: f64, y: f64) -> RouteResult<NodeId> {
        let probe = RouteNode { id: 0, x, y };
        self.nodes
            .iter()
            .min_by(|a, b| {
                a.distance_to(&probe)
                    .total_cmp(&b.distance_to(&probe))
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|node| node.id)
            .ok_or(Error::EmptyGraph)
    }

    fn neighbours(&self, id: NodeId) -> &[NodeId] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn distance(&self, a: NodeId, b: NodeId) -> f64 {
        if let Some(&weight) = self.weights.get(&(a.min(b), a.max(b))) {
            return weight;
        }
        match (self.node(a), self.node(b)) {
            (Some(a), Some(b)) => a.distance_to(&b),
            _ => f64::INFINITY,
        }
    }

    fn metric_scale(&self) -> f64 {
        self.metric_scale
    }
}

/// Four nodes A-B-C-D on a line with unit edge weights and scale 1.0.
///
/// Positions are 0.1 apart so percentages 0, 10, 20 and 30 on the x axis
/// resolve to A, B, C and D.
pub fn weighted_line() -> WeightedGraph {
    WeightedGraph::new(&[(0.0, 0.0), (0.1, 0.0), (0.2, 0.0), (0.3, 0.0)], 1.0)
        .connect(0, 1, 1.0)
        .connect(1, 2, 1.0)
        .connect(2, 3, 1.0)
}

/// Square grid of `size * size` nodes spaced 0.1 apart starting at (0.2, 0.2),
/// with a road along every row and column. Node ids run row by row.
pub fn road_grid(size: usize, metric_scale: f64) -> RoadGraph {
    let mut builder = RoadGraph::builder();
    let mut ids = Vec::with_capacity(size * size);
    for row in 0..size {
        for col in 0..size {
            ids.push(builder.add_node(0.2 + col as f64 * 0.1, 0.2 + row as f64 * 0.1));
        }
    }

    for row in 0..size {
        let road: Vec<NodeId> = (0..size).map(|col| ids[row * size + col]).collect();
        builder.add_road(&road);
    }
    for col in 0..size {
        let road: Vec<NodeId> = (0..size).map(|row| ids[row * size + col]).collect();
        builder.add_road(&road);
    }

    builder.metric_scale(metric_scale);
    builder.build().expect("grid builds")
}

/// Two separate road segments: (0.1, 0.1)-(0.2, 0.1) and (0.8, 0.8)-(0.9, 0.8).
pub fn two_components() -> RoadGraph {
    let mut builder = RoadGraph::builder();
    let a = builder.add_node(0.1, 0.1);
    let b = builder.add_node(0.2, 0.1);
    let c = builder.add_node(0.8, 0.8);
    let d = builder.add_node(0.9, 0.8);
    builder.add_edge(a, b).add_edge(c, d);
    builder.build().expect("graph builds")
}

/// Node 0 at (0.1, 0.1) has no roads; nodes 1 and 2 form a short road.
pub fn isolated_start() -> RoadGraph {
    let mut builder = RoadGraph::builder();
    builder.add_node(0.1, 0.1);
    let b = builder.add_node(0.5, 0.5);
    let c = builder.add_node(0.6, 0.5);
    builder.add_edge(b, c);
    builder.build().expect("graph builds")
}

/// Graph where the first path found to node 3 is not the cheapest one.
///
/// Start S=0 at (0, 0.5) and goal G=4 at (0.5, 0.5). Node 1 lies straight
/// towards the goal and is expanded first, discovering node 3 through a long
/// leg. Node 2 reaches node 3 more cheaply but is expanded later.
pub fn detour() -> RoadGraph {
    let mut builder = RoadGraph::builder();
    let s = builder.add_node(0.0, 0.5);
    let p1 = builder.add_node(0.25, 0.5);
    let p2 = builder.add_node(0.0, 0.375);
    let x = builder.add_node(0.05, 0.125);
    let g = builder.add_node(0.5, 0.5);
    builder
        .add_edge(s, p1)
        .add_edge(s, p2)
        .add_edge(p1, x)
        .add_edge(p2, x)
        .add_edge(x, g);
    builder.build().expect("graph builds")
}

/// Sum of model distances along `ids`, scaled to real-world units.
pub fn scaled_length<M: RouteModel + ?Sized>(model: &M, ids: &[NodeId]) -> f64 {
    ids.windows(2)
        .map(|pair| model.distance(pair[0], pair[1]))
        .sum::<f64>()
        * model.metric_scale()
}

/// Assert the structural guarantees every reconstructed route must meet.
pub fn assert_valid_path<M: RouteModel + ?Sized>(
    model: &M,
    path: &RoutePath,
    start: NodeId,
    goal: NodeId,
) {
    let ids = path.node_ids();
    assert_eq!(ids.first(), Some(&start), "route starts at the start node");
    assert_eq!(ids.last(), Some(&goal), "route ends at the goal node");

    for pair in ids.windows(2) {
        assert!(
            model.neighbours(pair[0]).contains(&pair[1]),
            "{} and {} are not adjacent",
            pair[0],
            pair[1]
        );
        assert!(model.neighbours(pair[1]).contains(&pair[0]));
    }

    let expected = scaled_length(model, &ids);
    assert!(
        (path.distance - expected).abs() < 1e-9 * expected.max(1.0),
        "distance {} does not match edge sum {}",
        path.distance,
        expected
    );
}
