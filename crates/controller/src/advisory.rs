//! Corridor speed advisory.
//!
//! Rule-based advisory for the road segment feeding the junction. Stateless
//! and independent of the intersection state.

use itms_types::{
    AdvisoryAction, AdvisoryReason, AdvisorySignal, CorridorAdvisory, CorridorTelemetry,
};

/// Posted limit while an emergency vehicle is on the corridor.
pub const PRIORITY_SPEED_LIMIT: u32 = 30;
/// Posted limit under heavy congestion.
pub const HEAVY_SPEED_LIMIT: u32 = 40;
/// Posted limit under moderate congestion.
pub const MODERATE_SPEED_LIMIT: u32 = 50;
/// Posted limit in free flow.
pub const NORMAL_SPEED_LIMIT: u32 = 60;

/// Advisory for the given corridor telemetry.
///
/// Rules, first match wins:
/// 1. emergency detected → priority mode
/// 2. more than 25 vehicles below 30 km/h → heavy congestion
/// 3. more than 15 vehicles below 40 km/h → moderate congestion
/// 4. otherwise → normal
pub fn advise(telemetry: &CorridorTelemetry) -> CorridorAdvisory {
    let count = telemetry.vehicle_count;
    let speed = telemetry.avg_speed;

    if telemetry.emergency_detected {
        CorridorAdvisory {
            action: AdvisoryAction::PriorityMode,
            signal: Some(AdvisorySignal::Green),
            speed_limit: PRIORITY_SPEED_LIMIT,
            reason: AdvisoryReason::Emergency,
        }
    } else if count > 25 && speed < 30.0 {
        reduce(HEAVY_SPEED_LIMIT, AdvisoryReason::HeavyCongestion)
    } else if count > 15 && speed < 40.0 {
        reduce(MODERATE_SPEED_LIMIT, AdvisoryReason::ModerateCongestion)
    } else {
        CorridorAdvisory {
            action: AdvisoryAction::Normal,
            signal: None,
            speed_limit: NORMAL_SPEED_LIMIT,
            reason: AdvisoryReason::Normal,
        }
    }
}

fn reduce(speed_limit: u32, reason: AdvisoryReason) -> CorridorAdvisory {
    CorridorAdvisory {
        action: AdvisoryAction::ReduceSpeed,
        signal: None,
        speed_limit,
        reason,
    }
}
