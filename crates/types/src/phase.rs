//! Phase timing and decisions.

use crate::{Arm, SignalColor};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base green time before queue-proportional extension.
pub const BASE_GREEN_SECS: u32 = 3;

/// Green extension per queued vehicle, in half-seconds (2.5 s).
pub const QUEUE_WEIGHT_HALFSECS: u32 = 5;

/// Minimum green granted to any arm.
pub const MIN_GREEN_SECS: u32 = 3;

/// Maximum green granted to any arm (excluding emergency hold).
pub const MAX_GREEN_SECS: u32 = 15;

/// Yellow clearance after a secondary-arm green.
pub const CLEARANCE_SECS: u32 = 2;

/// Green hold published for an emergency override.
pub const EMERGENCY_HOLD_SECS: u32 = 30;

/// Timing parameters for phase decisions.
///
/// Green time is `base_green_secs` plus `queue_weight_halfsecs / 2` seconds
/// per queued vehicle, truncated to whole seconds and clamped to
/// `[min_green_secs, max_green_secs]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTiming {
    pub base_green_secs: u32,
    pub queue_weight_halfsecs: u32,
    pub min_green_secs: u32,
    pub max_green_secs: u32,
    pub clearance_secs: u32,
    pub emergency_hold_secs: u32,
}

impl Default for PhaseTiming {
    fn default() -> Self {
        Self {
            base_green_secs: BASE_GREEN_SECS,
            queue_weight_halfsecs: QUEUE_WEIGHT_HALFSECS,
            min_green_secs: MIN_GREEN_SECS,
            max_green_secs: MAX_GREEN_SECS,
            clearance_secs: CLEARANCE_SECS,
            emergency_hold_secs: EMERGENCY_HOLD_SECS,
        }
    }
}

impl PhaseTiming {
    /// Green time in whole seconds for an arm with `queue` vehicles waiting.
    ///
    /// Inverted bounds are rejected at config load; if they slip through,
    /// `min_green_secs` wins rather than panicking.
    pub fn green_secs(&self, queue: u32) -> u32 {
        let raw = (queue as u64 * self.queue_weight_halfsecs as u64) / 2
            + self.base_green_secs as u64;
        let clamped = raw
            .min(self.max_green_secs as u64)
            .max(self.min_green_secs as u64);
        clamped as u32
    }
}

/// A derived right-of-way decision. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDecision {
    pub arm: Arm,
    pub color: SignalColor,
    pub duration_secs: u32,
}

impl PhaseDecision {
    /// Green for `arm` sized by its queue.
    pub fn green_for(arm: Arm, queue: u32, timing: &PhaseTiming) -> Self {
        Self {
            arm,
            color: SignalColor::Green,
            duration_secs: timing.green_secs(queue),
        }
    }

    /// Yellow clearance for `arm`.
    pub fn clearance_for(arm: Arm, timing: &PhaseTiming) -> Self {
        Self {
            arm,
            color: SignalColor::Yellow,
            duration_secs: timing.clearance_secs,
        }
    }

    /// Emergency hold on the primary arm.
    pub fn emergency_hold(timing: &PhaseTiming) -> Self {
        Self {
            arm: Arm::North,
            color: SignalColor::Green,
            duration_secs: timing.emergency_hold_secs,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs as u64)
    }
}
