//! Speed governor for the North approach.
//!
//! The governor turns queue pressure and operator settings into a single
//! actuator level in `0..=255`:
//!
//! | North queue | Base level |
//! |-------------|------------|
//! | 0           | 0          |
//! | 1–2         | 255        |
//! | 3–5         | 180        |
//! | > 5         | 120        |
//!
//! The danger flag replaces the tier value with [`GovernorConfig::danger_level`],
//! and the result is always capped by the operator's manual limit.
//!
//! The governor holds no state. Callers recompute on every arrival, departure
//! and settings change and publish the result unconditionally.

mod config;

pub use config::GovernorConfig;

use itms_types::{GovernorCommand, QueueState, SettingsState};

/// Governor output for the given inputs under the default tiers.
pub fn governor(north_queue: u32, danger: bool, manual_limit: u8) -> u8 {
    GovernorConfig::default().output(north_queue, danger, manual_limit)
}

impl GovernorConfig {
    /// Governor output for the given inputs.
    pub fn output(&self, north_queue: u32, danger: bool, manual_limit: u8) -> u8 {
        let base = if danger {
            self.danger_level
        } else {
            self.tier_level(north_queue)
        };
        base.min(manual_limit)
    }

    /// Build the outbound command from the live state aggregates.
    pub fn command(&self, queues: &QueueState, settings: &SettingsState) -> GovernorCommand {
        GovernorCommand {
            pwm: self.output(queues.north(), settings.danger, settings.manual_limit),
        }
    }

    fn tier_level(&self, north_queue: u32) -> u8 {
        if north_queue == 0 {
            self.empty_level
        } else if north_queue <= self.light_max {
            self.light_level
        } else if north_queue <= self.moderate_max {
            self.moderate_level
        } else {
            self.heavy_level
        }
    }
}
