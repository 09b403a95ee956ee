//! Configuration for the discovery engine.

use crate::partition::ErrorMeasure;
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options controlling one discovery run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Largest tolerated fraction of error rows, in [0, 1). 0 means exact.
    pub error_tolerance: f64,
    /// How error rows are counted
    pub error_measure: ErrorMeasure,
    /// Schemas wider than this fail fast instead of searching
    pub max_attributes: usize,
    /// Stop after evaluating this many lattice levels (partial result)
    pub max_lattice_level: Option<usize>,
    /// Stop at the first level boundary after this much wall time (partial result)
    pub deadline: Option<Duration>,
    /// Stop at the first level boundary after touching this many rows (partial result)
    pub row_budget: Option<u64>,
    /// Threads evaluating the nodes of one level
    pub workers: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            error_tolerance: 0.02,
            error_measure: ErrorMeasure::RowRatio,
            max_attributes: 24,
            max_lattice_level: None,
            deadline: None,
            row_budget: None,
            workers: num_cpus::get(),
        }
    }
}

impl DiscoveryConfig {
    /// Only exact dependencies.
    pub fn exact() -> Self {
        Self {
            error_tolerance: 0.0,
            ..Self::default()
        }
    }

    /// Tolerant search for noisy, uncleaned data.
    pub fn noisy(error_tolerance: f64) -> Self {
        Self {
            error_tolerance,
            ..Self::default()
        }
    }

    /// Checks the option ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.error_tolerance) {
            return Err(TermError::Configuration(format!(
                "error_tolerance must be in [0, 1), got {}",
                self.error_tolerance
            )));
        }
        if self.max_attributes == 0 {
            return Err(TermError::Configuration(
                "max_attributes must be at least 1".to_string(),
            ));
        }
        if self.max_lattice_level == Some(0) {
            return Err(TermError::Configuration(
                "max_lattice_level must be at least 1 when set".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(TermError::Configuration(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
