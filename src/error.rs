//! Error types for grid construction and configuration loading.

use thiserror::Error;

/// Fatal configuration errors. Failing to find a path is not an error, see
/// [PlanOutcome](crate::planner::PlanOutcome).
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("obstacle list is empty")]
    EmptyObstacles,

    #[error("obstacle coordinate lists differ in length ({x_len} x values, {y_len} y values)")]
    MismatchedObstacles { x_len: usize, y_len: usize },

    #[error("resolution must be finite and positive, got {0}")]
    InvalidResolution(f64),

    #[error("clearance radius must be non-negative, got {0}")]
    InvalidClearance(f64),

    #[error("obstacle {index} has a non-finite coordinate")]
    NonFiniteObstacle { index: usize },

    #[error("grid of {width_x} x {width_y} cells cannot be represented")]
    GridTooLarge { width_x: f64, width_y: f64 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for PlannerError {
    fn from(e: toml::de::Error) -> Self {
        PlannerError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
