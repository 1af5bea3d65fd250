//! Route planning entry points.
//!
//! This module provides:
//! - [`RouteAlgorithm`] - Supported search strategies (A*, Dijkstra)
//! - [`RouteRequest`] - Endpoints plus search options, loadable from JSON
//! - [`RoutePlan`] - Planned route result
//! - [`plan_route`] - Main entry point for computing routes
//! - [`plan_and_publish`] - Plan and hand the route to the model's path sink
//!
//! # Example
//!
//! ```ignore
//! use routeplanner_lib::{plan_route, RouteRequest};
//!
//! let request = RouteRequest::from_json(r#"{"start":{"x":10,"y":10},"goal":{"x":90,"y":90}}"#)?;
//! let plan = plan_route(&graph, &request)?;
//! println!("Route: {} hops, {:.1} m", plan.hop_count(), plan.distance);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{NodeId, PathSink, RouteModel, RouteNode};
use crate::path::{Heuristic, MapPoint, RouteSearch, SearchOptions, SearchStats, ZeroHeuristic};

/// Supported search strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteAlgorithm {
    /// A* search guided by straight-line distance.
    #[default]
    #[serde(rename = "a-star")]
    AStar,
    /// Uninformed search (zero heuristic).
    Dijkstra,
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteAlgorithm::AStar => "a-star",
            RouteAlgorithm::Dijkstra => "dijkstra",
        };
        f.write_str(value)
    }
}

/// High-level route planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: MapPoint,
    pub goal: MapPoint,
    #[serde(default)]
    pub algorithm: RouteAlgorithm,
    #[serde(default)]
    pub options: SearchOptions,
}

impl RouteRequest {
    /// Convenience constructor for A* routes with default options.
    pub fn a_star(start: MapPoint, goal: MapPoint) -> Self {
        Self {
            start,
            goal,
            algorithm: RouteAlgorithm::AStar,
            options: SearchOptions::default(),
        }
    }

    /// Parse a request from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    pub algorithm: RouteAlgorithm,
    pub start: NodeId,
    pub goal: NodeId,
    pub steps: Vec<RouteNode>,
    /// Route length in real-world units.
    pub distance: f64,
    pub stats: SearchStats,
}

impl RoutePlan {
    /// Number of hops in the route.
    pub fn hop_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// Compute a route for `request`.
///
/// Unlike [`RouteSearch::run`], an unreachable goal is reported as
/// [`Error::RouteNotFound`].
pub fn plan_route<M: RouteModel + ?Sized>(
    model: &M,
    request: &RouteRequest,
) -> Result<RoutePlan> {
    match request.algorithm {
        RouteAlgorithm::AStar => {
            let search = RouteSearch::new(model, request.start, request.goal)?;
            execute(search, request)
        }
        RouteAlgorithm::Dijkstra => {
            let search =
                RouteSearch::with_heuristic(model, request.start, request.goal, ZeroHeuristic)?;
            execute(search, request)
        }
    }
}

/// Compute a route and hand its steps to the model's [`PathSink`].
pub fn plan_and_publish<M: RouteModel + PathSink>(
    model: &mut M,
    request: &RouteRequest,
) -> Result<RoutePlan> {
    let plan = plan_route(&*model, request)?;
    model.receive_path(plan.steps.clone());
    Ok(plan)
}

fn execute<M: RouteModel + ?Sized, H: Heuristic>(
    search: RouteSearch<'_, M, H>,
    request: &RouteRequest,
) -> Result<RoutePlan> {
    let mut search = search.with_options(request.options);
    let path = search
        .run()?
        .into_path()
        .ok_or_else(|| Error::RouteNotFound {
            start: search.start(),
            goal: search.goal(),
        })?;

    Ok(RoutePlan {
        algorithm: request.algorithm,
        start: search.start(),
        goal: search.goal(),
        steps: path.nodes,
        distance: path.distance,
        stats: search.stats(),
    })
}
