//! Governor tier configuration.

use serde::{Deserialize, Serialize};

/// Queue tiers and output levels for the speed governor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Output with an empty queue (stop feeding the junction).
    pub empty_level: u8,

    /// Largest queue still considered light.
    pub light_max: u32,
    pub light_level: u8,

    /// Largest queue still considered moderate. Anything above is heavy.
    pub moderate_max: u32,
    pub moderate_level: u8,

    pub heavy_level: u8,

    /// Output while the danger flag is engaged.
    pub danger_level: u8,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            empty_level: 0,
            light_max: 2,
            light_level: 255,
            moderate_max: 5,
            moderate_level: 180,
            heavy_level: 120,
            danger_level: 90,
        }
    }
}
