//! Road-network route planner library entry points.
//!
//! This crate snaps map positions onto a road graph, runs an A* search
//! between them, and reports the ordered waypoints plus the real-world route
//! length. Graph sources implement [`RouteModel`]; [`RoadGraph`] is the
//! in-memory implementation used by callers that already hold node and road
//! data. Higher-level consumers should go through [`plan_route`] or
//! [`RouteSearch`] instead of reimplementing the search.
//!

#![deny(warnings)]

pub mod error;
pub mod graph;
pub mod model;
pub mod path;
pub mod routing;
pub mod spatial;

pub use error::{Axis, Error, Result};
pub use graph::{RoadGraph, RoadGraphBuilder};
pub use model::{NodeId, PathSink, RouteModel, RouteNode};
pub use path::{
    CancellationToken, Heuristic, MapPoint, RelaxationPolicy, RoutePath, RouteSearch,
    SearchOptions, SearchOutcome, SearchState, SearchStats, StraightLine, ZeroHeuristic,
};
pub use routing::{plan_and_publish, plan_route, RouteAlgorithm, RoutePlan, RouteRequest};
pub use spatial::NodeIndex;
