use std::sync::OnceLock;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{NodeId, PathSink, RouteModel, RouteNode};
use crate::spatial::NodeIndex;

/// Scale applied when the builder is not given one: graph units are metres.
const DEFAULT_METRIC_SCALE: f64 = 1.0;

/// In-memory road network implementing [`RouteModel`].
///
/// Nodes are connected by roads (polylines). A node's neighbours are the
/// nodes immediately before and after it along every road it lies on. They
/// are discovered the first time a search asks for them and cached per node,
/// so the graph can be shared by concurrent searches.
#[derive(Debug)]
pub struct RoadGraph {
    nodes: Vec<RouteNode>,
    roads: Vec<Vec<NodeId>>,
    node_roads: Vec<Vec<usize>>,
    neighbours: Vec<OnceLock<Vec<NodeId>>>,
    index: NodeIndex,
    metric_scale: f64,
    path: Vec<RouteNode>,
}

impl RoadGraph {
    /// Start building a new road graph.
    pub fn builder() -> RoadGraphBuilder {
        RoadGraphBuilder::default()
    }

    /// All nodes, indexed by [`NodeId`].
    pub fn nodes(&self) -> &[RouteNode] {
        &self.nodes
    }

    /// All roads as ordered node sequences.
    pub fn roads(&self) -> &[Vec<NodeId>] {
        &self.roads
    }

    /// Last route handed to this graph through [`PathSink::receive_path`].
    pub fn path(&self) -> &[RouteNode] {
        &self.path
    }

    fn discover_neighbours(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        for &road_index in &self.node_roads[id] {
            let road = &self.roads[road_index];
            for (position, &node) in road.iter().enumerate() {
                if node != id {
                    continue;
                }
                if position > 0 {
                    found.push(road[position - 1]);
                }
                if let Some(&next) = road.get(position + 1) {
                    found.push(next);
                }
            }
        }

        found.retain(|&other| other != id);
        found.sort_unstable();
        found.dedup();

        debug!(node = id, neighbours = found.len(), "discovered neighbours");
        found
    }
}

impl RouteModel for RoadGraph {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, id: NodeId) -> Option<RouteNode> {
        self.nodes.get(id).copied()
    }

    fn find_nearest_node(&self, x: f64, y: f64) -> Result<NodeId> {
        self.index
            .nearest([x, y])
            .map(|(id, _)| id)
            .ok_or(Error::EmptyGraph)
    }

    fn neighbours(&self, id: NodeId) -> &[NodeId] {
        match self.neighbours.get(id) {
            Some(cell) => cell.get_or_init(|| self.discover_neighbours(id)).as_slice(),
            None => &[],
        }
    }

    fn metric_scale(&self) -> f64 {
        self.metric_scale
    }
}

impl PathSink for RoadGraph {
    fn receive_path(&mut self, path: Vec<RouteNode>) {
        debug!(steps = path.len(), "road graph received route");
        self.path = path;
    }
}

/// Incremental builder for [`RoadGraph`].
#[derive(Debug, Default)]
pub struct RoadGraphBuilder {
    nodes: Vec<RouteNode>,
    roads: Vec<Vec<NodeId>>,
    metric_scale: Option<f64>,
}

impl RoadGraphBuilder {
    /// Add a node at `(x, y)` in normalized map units and return its id.
    pub fn add_node(&mut self, x: f64, y: f64) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(RouteNode { id, x, y });
        id
    }

    /// Add a road running through `nodes` in order.
    ///
    /// Roads with fewer than two nodes connect nothing and are dropped at
    /// build time.
    pub fn add_road(&mut self, nodes: &[NodeId]) -> &mut Self {
        self.roads.push(nodes.to_vec());
        self
    }

    /// Add a single undirected edge between two nodes.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> &mut Self {
        self.add_road(&[a, b])
    }

    /// Set the factor converting graph units into metres.
    pub fn metric_scale(&mut self, scale: f64) -> &mut Self {
        self.metric_scale = Some(scale);
        self
    }

    /// Validate the collected nodes and roads and build the graph.
    pub fn build(self) -> Result<RoadGraph> {
        let metric_scale = self.metric_scale.unwrap_or(DEFAULT_METRIC_SCALE);
        if !metric_scale.is_finite() || metric_scale <= 0.0 {
            return Err(Error::InvalidMetricScale {
                value: metric_scale,
            });
        }

        if let Some(node) = self
            .nodes
            .iter()
            .find(|node| !node.x.is_finite() || !node.y.is_finite())
        {
            return Err(Error::InvalidNodePosition { id: node.id });
        }

        let node_count = self.nodes.len();
        let mut roads = Vec::with_capacity(self.roads.len());
        let mut node_roads: Vec<Vec<usize>> = vec![Vec::new(); node_count];

        for road in self.roads {
            if let Some(&id) = road.iter().find(|&&id| id >= node_count) {
                return Err(Error::UnknownNode { id });
            }
            if road.len() < 2 {
                continue;
            }

            let road_index = roads.len();
            for &id in &road {
                let memberships = &mut node_roads[id];
                if memberships.last() != Some(&road_index) {
                    memberships.push(road_index);
                }
            }
            roads.push(road);
        }

        let index = NodeIndex::build(&self.nodes);
        let neighbours = (0..node_count).map(|_| OnceLock::new()).collect();

        info!(
            node_count,
            road_count = roads.len(),
            metric_scale,
            "built road graph"
        );

        Ok(RoadGraph {
            nodes: self.nodes,
            roads,
            node_roads,
            neighbours,
            index,
            metric_scale,
            path: Vec::new(),
        })
    }
}
