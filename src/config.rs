use serde::{Deserialize, Serialize};

use crate::environment::DEFAULT_GRID_RESOLUTION;

/// Construction parameters for [`crate::build_environment_instance`].
/// Plain, `Default`-deriving constructor arguments rather than a
/// file-based configuration layer, mirroring the original's own keyword
/// arguments with defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Side length of the uniform spatial-index grid (`K` in spec.md §4.3).
    pub grid_resolution: usize,
    pub logging: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        EnvironmentConfig {
            grid_resolution: DEFAULT_GRID_RESOLUTION,
            logging: false,
        }
    }
}

/// Construction parameters for [`crate::build_graph`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadmapConfig {
    pub num_samples: usize,
    pub seed: u64,
    pub logging: bool,
}

impl Default for RoadmapConfig {
    fn default() -> Self {
        RoadmapConfig {
            num_samples: 200,
            seed: 0,
            logging: false,
        }
    }
}

/// Parameters for [`crate::plan`] / [`crate::plan_pruned`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub start_time: f64,
    pub timeout_secs: f64,
    /// `None` runs the exact search; `Some(precision)` runs the
    /// temporally-pruned search bucketed at that resolution.
    pub temporal_precision: Option<f64>,
    pub logging: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            start_time: 0.0,
            timeout_secs: 30.0,
            temporal_precision: None,
            logging: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_quiet_and_exact() {
        assert!(!EnvironmentConfig::default().logging);
        assert!(!RoadmapConfig::default().logging);
        let planner = PlannerConfig::default();
        assert!(!planner.logging);
        assert!(planner.temporal_precision.is_none());
    }
}
