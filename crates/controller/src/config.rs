//! Controller configuration.

use itms_governor::GovernorConfig;
use itms_types::{PhaseTiming, QueueState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default radius inside which an emergency vehicle preempts the junction.
pub const EMERGENCY_RADIUS_METERS: f64 = 200.0;

/// A controller configuration that cannot be run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("min_green_secs ({min}) exceeds max_green_secs ({max})")]
    InvertedGreenBounds { min: u32, max: u32 },

    #[error("min_green_secs must be at least 1")]
    ZeroMinGreen,

    #[error("emergency_radius_m must be finite and non-negative, got {0}")]
    EmergencyRadius(f64),
}

/// Configuration for the intersection controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Green/yellow/emergency phase lengths.
    pub timing: PhaseTiming,

    /// Emergency reports closer than this (meters) engage preemption.
    pub emergency_radius_m: f64,

    /// Queue counts at startup.
    pub initial_queues: QueueState,

    /// Speed governor tiers.
    pub governor: GovernorConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            timing: PhaseTiming::default(),
            emergency_radius_m: EMERGENCY_RADIUS_METERS,
            initial_queues: QueueState::baseline(),
            governor: GovernorConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Create a config that starts from the given queues.
    pub fn with_initial_queues(initial_queues: QueueState) -> Self {
        Self {
            initial_queues,
            ..Default::default()
        }
    }

    /// Set the phase timing.
    pub fn with_timing(mut self, timing: PhaseTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Reject settings the scheduler cannot honor.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let timing = &self.timing;
        if timing.min_green_secs == 0 {
            return Err(ConfigValidationError::ZeroMinGreen);
        }
        if timing.min_green_secs > timing.max_green_secs {
            return Err(ConfigValidationError::InvertedGreenBounds {
                min: timing.min_green_secs,
                max: timing.max_green_secs,
            });
        }
        if !self.emergency_radius_m.is_finite() || self.emergency_radius_m < 0.0 {
            return Err(ConfigValidationError::EmergencyRadius(self.emergency_radius_m));
        }
        Ok(())
    }
}
