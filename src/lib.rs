//! # grid_dfs_planner
//!
//! Grid-based path planning for a robot among point obstacles. The obstacle
//! points are rasterized into an [OccupancyGrid](occupancy_grid::OccupancyGrid),
//! blocking every cell whose center lies within the robot's clearance radius of
//! an obstacle, and a [DepthFirstPlanner](planner::DepthFirstPlanner) searches
//! the free cells with a fixed
//! [8-connected motion model](motion::MOTION_MODEL).
//!
//! The search is depth-first and returns the first path it finds, which is
//! deterministic for a given input but not in general the cheapest. Paths are
//! returned goal first.
//!
//! ```
//! use grid_dfs_planner::DepthFirstPlanner;
//!
//! // A 10x10 room bounded by walls on every side
//! let mut ox = Vec::new();
//! let mut oy = Vec::new();
//! for i in 0..=11 {
//!     ox.extend([i as f64, i as f64, 0.0, 11.0]);
//!     oy.extend([0.0, 11.0, i as f64, i as f64]);
//! }
//! let planner = DepthFirstPlanner::new(&ox, &oy, 1.0, 0.5).unwrap();
//! let path = planner.plan(1.0, 1.0, 10.0, 10.0).into_path().unwrap();
//! assert_eq!(path.waypoints.first(), Some(&(10.0, 10.0)));
//! assert_eq!(path.waypoints.last(), Some(&(1.0, 1.0)));
//! ```
pub mod config;
pub mod error;
pub mod motion;
pub mod occupancy_grid;
pub mod planner;

pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use occupancy_grid::OccupancyGrid;
pub use planner::{
    DepthFirstPlanner, ExhaustReason, ExpansionObserver, NoopObserver, Path, PlanOutcome,
    SearchStats,
};

/// Inline capacity for successor lists, one slot per motion.
pub const N_SMALLVEC_SIZE: usize = 8;
