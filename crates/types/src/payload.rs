//! Bus payload schemas.
//!
//! Inbound payloads are decoded leniently: missing optional fields take the
//! defaults the field devices rely on, unknown fields are ignored.

use crate::{Arm, PhaseDecision, SignalColor};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// Inbound
// ═══════════════════════════════════════════════════════════════════════════

/// Status report from the signal hardware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareStatus {
    #[serde(default)]
    pub state: String,
}

impl HardwareStatus {
    /// Status value meaning the physical North phase has finished.
    pub const CYCLE_COMPLETE: &'static str = "cycle_complete";

    pub fn is_cycle_complete(&self) -> bool {
        self.state == Self::CYCLE_COMPLETE
    }
}

/// Emergency vehicle distance report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityReport {
    /// Distance to the stop line in meters. Absent means "far away".
    #[serde(default = "ProximityReport::far_away")]
    pub distance: f64,
}

impl ProximityReport {
    fn far_away() -> f64 {
        1000.0
    }
}

/// Externally observed queue length for one arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueReport {
    pub arm: Arm,
    pub count: u32,
}

/// Aggregated road-segment telemetry from the corridor sensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorTelemetry {
    pub vehicle_count: u32,
    /// Mean speed in km/h.
    pub avg_speed: f64,
    pub emergency_detected: bool,
}

// ═══════════════════════════════════════════════════════════════════════════
// Outbound
// ═══════════════════════════════════════════════════════════════════════════

/// Right-of-way command for the signal hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCommand {
    pub color: SignalColor,
    /// Phase length in whole seconds.
    pub duration: u32,
}

impl From<PhaseDecision> for SignalCommand {
    fn from(decision: PhaseDecision) -> Self {
        Self {
            color: decision.color,
            duration: decision.duration_secs,
        }
    }
}

/// Output level for the approach speed actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorCommand {
    pub pwm: u8,
}

/// Advisory kind for the upstream corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryAction {
    PriorityMode,
    ReduceSpeed,
    Normal,
}

impl AdvisoryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AdvisoryAction::PriorityMode => "priority_mode",
            AdvisoryAction::ReduceSpeed => "reduce_speed",
            AdvisoryAction::Normal => "normal",
        }
    }
}

/// Why an advisory was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryReason {
    Emergency,
    HeavyCongestion,
    ModerateCongestion,
    Normal,
}

/// Signal hint attached to priority advisories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorySignal {
    Green,
}

/// Speed advisory for road-side signage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorridorAdvisory {
    pub action: AdvisoryAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<AdvisorySignal>,
    /// Posted limit in km/h.
    pub speed_limit: u32,
    pub reason: AdvisoryReason,
}
