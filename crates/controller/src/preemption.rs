//! Emergency vehicle preemption.

use crate::PhaseScheduler;
use itms_core::{Action, OutboundMessage};
use itms_types::{AuditAction, AuditRecord, QueueState, SignalCommand};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Forces North green while an emergency vehicle is inside the radius.
///
/// Edge-triggered: only the transition into the active state takes the
/// intersection. Clearing the flag leaves the override's North green in place;
/// normal scheduling resumes on the next arrival or hardware cycle completion.
#[derive(Debug, Clone)]
pub struct EmergencyPreemption {
    radius_m: f64,
}

impl EmergencyPreemption {
    pub fn new(radius_m: f64) -> Self {
        Self { radius_m }
    }

    /// Whether a report at `distance_meters` puts the junction in emergency.
    ///
    /// Non-finite distances never engage preemption.
    pub fn is_near(&self, distance_meters: f64) -> bool {
        distance_meters.is_finite() && distance_meters < self.radius_m
    }

    /// Handle a proximity report.
    pub fn on_proximity(
        &self,
        distance_meters: f64,
        scheduler: &mut PhaseScheduler,
        queues: &QueueState,
        now: Duration,
    ) -> Vec<Action> {
        if !distance_meters.is_finite() {
            warn!(distance = distance_meters, "Non-finite emergency distance treated as far");
        }

        let active = self.is_near(distance_meters);
        let was_active = scheduler.state().emergency_active;
        scheduler.set_emergency(active);

        match (was_active, active) {
            (false, true) => {
                let decision = scheduler.force_emergency_hold();
                info!(
                    distance = distance_meters,
                    hold_secs = decision.duration_secs,
                    "Emergency preemption, forcing North green"
                );
                vec![
                    Action::Publish(OutboundMessage::Signal(SignalCommand::from(decision))),
                    Action::AppendAudit(AuditRecord::new(
                        now,
                        AuditAction::Emergency,
                        json!({ "action": "Forced North Green", "distance": distance_meters }),
                    )),
                    scheduler.snapshot(queues),
                ]
            }
            (true, false) => {
                info!(
                    distance = distance_meters,
                    "Emergency cleared, holding until next arrival or cycle completion"
                );
                vec![scheduler.snapshot(queues)]
            }
            _ => {
                debug!(distance = distance_meters, active = active, "Emergency state unchanged");
                vec![]
            }
        }
    }
}
