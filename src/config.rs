//! Planner configuration, constructible in code or loaded from TOML.

use crate::error::{PlannerError, Result};
use serde::Deserialize;
use std::path::Path;

/// Grid and search parameters.
///
/// ```toml
/// resolution = 2.0
/// clearance_radius = 1.0
/// max_expansions = 50000
/// component_precheck = true
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PlannerConfig {
    /// Cell size in world units
    pub resolution: f64,

    /// Cells whose center is within this distance of an obstacle are blocked (default: 0.0)
    #[serde(default)]
    pub clearance_radius: f64,

    /// Stop and report exhaustion after this many expansions (default: unbounded)
    #[serde(default)]
    pub max_expansions: Option<usize>,

    /// Reject goals in another connected component before searching (default: false)
    #[serde(default)]
    pub component_precheck: bool,

    /// Largest cell count for which the closed set is a dense array (default: 4194304)
    #[serde(default = "default_dense_closed_limit")]
    pub dense_closed_limit: usize,
}

fn default_dense_closed_limit() -> usize {
    1 << 22
}

impl PlannerConfig {
    pub fn new(resolution: f64, clearance_radius: f64) -> Self {
        PlannerConfig {
            resolution,
            clearance_radius,
            max_expansions: None,
            component_precheck: false,
            dense_closed_limit: default_dense_closed_limit(),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: PlannerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Checks the grid parameters. Called by the grid builder as well.
    pub fn validate(&self) -> Result<()> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(PlannerError::InvalidResolution(self.resolution));
        }
        if self.clearance_radius.is_nan() || self.clearance_radius < 0.0 {
            return Err(PlannerError::InvalidClearance(self.clearance_radius));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_toml() {
        let config = PlannerConfig::from_toml_str("resolution = 2.0").unwrap();
        assert_eq!(config, PlannerConfig::new(2.0, 0.0));
    }

    #[test]
    fn parse_full_toml() {
        let config = PlannerConfig::from_toml_str(
            "resolution = 0.5\nclearance_radius = 1.5\nmax_expansions = 100\n\
             component_precheck = true\ndense_closed_limit = 16\n",
        )
        .unwrap();
        assert_eq!(config.resolution, 0.5);
        assert_eq!(config.clearance_radius, 1.5);
        assert_eq!(config.max_expansions, Some(100));
        assert!(config.component_precheck);
        assert_eq!(config.dense_closed_limit, 16);
    }

    #[test]
    fn reject_bad_values() {
        assert!(matches!(
            PlannerConfig::from_toml_str("resolution = 0.0"),
            Err(PlannerError::InvalidResolution(_))
        ));
        assert!(matches!(
            PlannerConfig::from_toml_str("resolution = 1.0\nclearance_radius = -1.0"),
            Err(PlannerError::InvalidClearance(_))
        ));
        assert!(matches!(
            PlannerConfig::from_toml_str("clearance_radius = 1.0"),
            Err(PlannerError::Config(_))
        ));
        assert!(PlannerConfig::new(1.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            PlannerConfig::load("/nonexistent/planner.toml"),
            Err(PlannerError::Io(_))
        ));
    }
}
