//! A* route search over a [`RouteModel`].
//!
//! A [`RouteSearch`] is created for one pair of endpoints given as
//! percentages of the map extent. Both endpoints are snapped to their nearest
//! graph nodes, then the search repeatedly expands the frontier node with the
//! lowest `g + h` until it reaches the goal or runs out of candidates.
//!
//! # Single assignment
//!
//! By default a node's parent, `g` and `h` are fixed the moment it is first
//! discovered; a later, cheaper path to a node that is still on the frontier
//! is ignored. This keeps each node in the frontier exactly once and the
//! expansion order reproducible. On graphs where that can miss the shortest
//! route, select [`RelaxationPolicy::Relax`] to get classical A* behaviour.
//!
//! # Example
//!
//! ```ignore
//! use routeplanner_lib::{MapPoint, RoadGraph, RouteSearch};
//!
//! let graph: RoadGraph = load_somehow();
//! let mut search = RouteSearch::new(&graph, MapPoint::new(10.0, 10.0), MapPoint::new(90.0, 90.0))?;
//! if let Some(path) = search.run()?.path() {
//!     println!("{} m over {} hops", path.distance, path.hop_count());
//! }
//! ```

mod frontier;
mod heuristic;

pub use heuristic::{Heuristic, StraightLine, ZeroHeuristic};

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Axis, Error, Result};
use crate::model::{NodeId, RouteModel, RouteNode};

use frontier::Frontier;

/// Largest accepted endpoint percentage.
const MAX_PERCENT: f64 = 100.0;

/// Route endpoint expressed as percentages (0-100) of the map extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert to normalized map units, rejecting values outside 0-100.
    fn to_map_units(self) -> Result<[f64; 2]> {
        Ok([
            percent_to_unit(Axis::X, self.x)?,
            percent_to_unit(Axis::Y, self.y)?,
        ])
    }
}

fn percent_to_unit(axis: Axis, value: f64) -> Result<f64> {
    if !value.is_finite() || !(0.0..=MAX_PERCENT).contains(&value) {
        return Err(Error::CoordinateOutOfRange { axis, value });
    }
    Ok(value / MAX_PERCENT)
}

/// How the search treats a cheaper path to a node already on the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxationPolicy {
    /// Keep the first parent and cost assigned at discovery.
    #[default]
    SingleAssignment,
    /// Lower the cost and re-parent frontier nodes when a cheaper path appears.
    Relax,
}

/// Tunables for a single search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchOptions {
    pub relaxation: RelaxationPolicy,
    /// Stop with "no route" after this many node expansions.
    pub max_expansions: Option<usize>,
}

/// Shared flag used to stop a running search from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Lifecycle of a search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    Running,
    Succeeded,
    Failed,
}

/// Counters collected while a search runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SearchStats {
    /// Nodes whose neighbours were expanded.
    pub expanded: usize,
    /// Nodes added to the frontier for the first time.
    pub discovered: usize,
    /// Frontier nodes whose cost was lowered (relaxation policy only).
    pub relaxed: usize,
}

/// Route found by a search, ordered from start to goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePath {
    pub nodes: Vec<RouteNode>,
    /// Total length in real-world units (graph distance times metric scale).
    pub distance: f64,
}

impl RoutePath {
    /// Number of edges travelled.
    pub fn hop_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Identifiers of the nodes along the route.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|node| node.id).collect()
    }
}

/// Terminal result of a search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(RoutePath),
    NotFound,
}

impl SearchOutcome {
    pub fn path(&self) -> Option<&RoutePath> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            SearchOutcome::NotFound => None,
        }
    }

    pub fn into_path(self) -> Option<RoutePath> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            SearchOutcome::NotFound => None,
        }
    }
}

/// Per-session bookkeeping for a discovered node. Presence in the table
/// means the node has been visited.
#[derive(Debug, Clone, Copy)]
struct NodeState {
    g: f64,
    h: f64,
    parent: Option<NodeId>,
    expanded: bool,
}

/// A* search session between two fixed endpoints.
pub struct RouteSearch<'g, M: RouteModel + ?Sized, H: Heuristic = StraightLine> {
    model: &'g M,
    heuristic: H,
    options: SearchOptions,
    cancellation: Option<CancellationToken>,
    start: NodeId,
    goal: NodeId,
    current: NodeId,
    nodes: HashMap<NodeId, NodeState>,
    frontier: Frontier,
    state: SearchState,
    path: Option<RoutePath>,
    stats: SearchStats,
}

impl<'g, M: RouteModel + ?Sized> RouteSearch<'g, M, StraightLine> {
    /// Resolve both endpoints and prepare a search using the straight-line
    /// heuristic.
    ///
    /// Fails before any search work when the graph is empty or an endpoint
    /// lies outside the 0-100 percent range.
    pub fn new(model: &'g M, start: MapPoint, goal: MapPoint) -> Result<Self> {
        Self::with_heuristic(model, start, goal, StraightLine)
    }
}

impl<'g, M: RouteModel + ?Sized, H: Heuristic> RouteSearch<'g, M, H> {
    /// Resolve both endpoints and prepare a search using `heuristic`.
    ///
    /// The heuristic should be admissible; see [`Heuristic`].
    pub fn with_heuristic(
        model: &'g M,
        start: MapPoint,
        goal: MapPoint,
        heuristic: H,
    ) -> Result<Self> {
        let start_units = start.to_map_units()?;
        let goal_units = goal.to_map_units()?;

        if model.node_count() == 0 {
            return Err(Error::EmptyGraph);
        }

        let start_node = model.find_nearest_node(start_units[0], start_units[1])?;
        let goal_node = model.find_nearest_node(goal_units[0], goal_units[1])?;

        debug!(
            start = start_node,
            goal = goal_node,
            "resolved route endpoints"
        );

        let mut nodes = HashMap::new();
        nodes.insert(
            start_node,
            NodeState {
                g: 0.0,
                h: heuristic.estimate(model, start_node, goal_node),
                parent: None,
                expanded: false,
            },
        );

        Ok(Self {
            model,
            heuristic,
            options: SearchOptions::default(),
            cancellation: None,
            start: start_node,
            goal: goal_node,
            current: start_node,
            nodes,
            frontier: Frontier::default(),
            state: SearchState::Running,
            path: None,
            stats: SearchStats::default(),
        })
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Check `token` before every iteration and abort once it is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Node the start coordinates resolved to.
    pub fn start(&self) -> NodeId {
        self.start
    }

    /// Node the goal coordinates resolved to.
    pub fn goal(&self) -> NodeId {
        self.goal
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn path_found(&self) -> bool {
        self.state == SearchState::Succeeded
    }

    /// Route found so far; `None` unless the search succeeded.
    pub fn path(&self) -> Option<&RoutePath> {
        self.path.as_ref()
    }

    /// Route length in real-world units; `None` unless the search succeeded.
    pub fn distance(&self) -> Option<f64> {
        self.path.as_ref().map(|path| path.distance)
    }

    /// Run the search to completion.
    ///
    /// "No route" is a normal [`SearchOutcome::NotFound`]; only cancellation
    /// and model inconsistencies are errors.
    pub fn run(&mut self) -> Result<SearchOutcome> {
        while self.step()? == SearchState::Running {}
        Ok(self.outcome())
    }

    /// Advance the search by one iteration and return the resulting state.
    ///
    /// Calling `step` on a finished search returns its terminal state.
    pub fn step(&mut self) -> Result<SearchState> {
        if self.state != SearchState::Running {
            return Ok(self.state);
        }

        if let Some(token) = &self.cancellation {
            if token.is_cancelled() {
                return Err(Error::SearchCancelled {
                    expanded: self.stats.expanded,
                });
            }
        }

        if self.current == self.goal {
            let path = self.reconstruct_path(self.goal)?;
            debug!(
                start = self.start,
                goal = self.goal,
                hops = path.hop_count(),
                distance = path.distance,
                expanded = self.stats.expanded,
                "route search succeeded"
            );
            self.path = Some(path);
            self.state = SearchState::Succeeded;
            return Ok(self.state);
        }

        if let Some(limit) = self.options.max_expansions {
            if self.stats.expanded >= limit {
                warn!(
                    start = self.start,
                    goal = self.goal,
                    limit,
                    "route search hit its expansion limit"
                );
                self.state = SearchState::Failed;
                return Ok(self.state);
            }
        }

        self.expand(self.current);

        match self.select_next() {
            Some(next) => self.current = next,
            None => {
                warn!(
                    start = self.start,
                    goal = self.goal,
                    expanded = self.stats.expanded,
                    "no route found between endpoints"
                );
                self.state = SearchState::Failed;
            }
        }

        Ok(self.state)
    }

    fn outcome(&self) -> SearchOutcome {
        match &self.path {
            Some(path) => SearchOutcome::Found(path.clone()),
            None => SearchOutcome::NotFound,
        }
    }

    /// Score and enqueue every undiscovered neighbour of `current`.
    fn expand(&mut self, current: NodeId) {
        let model = self.model;
        let goal = self.goal;
        let relax = self.options.relaxation == RelaxationPolicy::Relax;

        let current_g = match self.nodes.get_mut(&current) {
            Some(state) => {
                state.expanded = true;
                state.g
            }
            None => return,
        };
        self.stats.expanded += 1;

        for &neighbour in model.neighbours(current) {
            let g = current_g + model.distance(current, neighbour);

            match self.nodes.entry(neighbour) {
                Entry::Vacant(slot) => {
                    let h = self.heuristic.estimate(model, neighbour, goal);
                    slot.insert(NodeState {
                        g,
                        h,
                        parent: Some(current),
                        expanded: false,
                    });
                    self.frontier.push(neighbour, g, h);
                    self.stats.discovered += 1;
                }
                Entry::Occupied(mut slot) => {
                    let state = slot.get_mut();
                    if relax && !state.expanded && g < state.g {
                        state.g = g;
                        state.parent = Some(current);
                        self.frontier.push(neighbour, g, state.h);
                        self.stats.relaxed += 1;
                    }
                }
            }
        }

        debug!(
            node = current,
            frontier = self.frontier.len(),
            "expanded node"
        );
    }

    /// Pop the cheapest live frontier entry.
    fn select_next(&mut self) -> Option<NodeId> {
        while let Some(entry) = self.frontier.pop() {
            // Entries superseded by a relaxation carry an outdated cost.
            let live = self
                .nodes
                .get(&entry.node)
                .is_some_and(|state| !state.expanded && state.g == entry.cost.0);
            if live {
                return Some(entry.node);
            }
        }
        None
    }

    /// Walk parent links back from `goal` and return the route start-first.
    fn reconstruct_path(&self, goal: NodeId) -> Result<RoutePath> {
        let mut nodes = Vec::new();
        let mut total = 0.0;
        let mut current = goal;

        loop {
            let node = self
                .model
                .node(current)
                .ok_or(Error::UnknownNode { id: current })?;
            nodes.push(node);

            match self.nodes.get(&current).and_then(|state| state.parent) {
                Some(parent) => {
                    total += self.model.distance(current, parent);
                    current = parent;
                }
                None => break,
            }
        }

        nodes.reverse();
        Ok(RoutePath {
            nodes,
            distance: total * self.model.metric_scale(),
        })
    }
}
