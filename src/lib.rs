//! Time-aware probabilistic roadmap planning among static and time-varying
//! obstacles.
//!
//! A typical session: classify a raw obstacle list into an
//! [`EnvironmentInstance`] against a query horizon, sample a
//! [`RoadmapGraph`] over its free space, connect a start and goal, then
//! search the graph with [`plan`] or [`plan_pruned`].

pub mod config;
pub mod environment;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod interval;
pub mod obstacle;
pub mod planner;
pub mod recurrence;
pub mod timed_edge;

pub use config::{EnvironmentConfig, PlannerConfig, RoadmapConfig};
pub use environment::{build_environment_instance, EnvironmentInstance};
pub use error::TaPrmError;
pub use geometry::{Point2, Rect, Segment, Shape};
pub use graph::{build_graph, RoadmapGraph};
pub use interval::Interval;
pub use obstacle::Obstacle;
pub use planner::{plan, plan_pruned, PlanResult};
pub use recurrence::Recurrence;
pub use timed_edge::TimedEdge;
