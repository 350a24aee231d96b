//! Core types for the ITMS intersection controller.
//!
//! Leaf data structures shared by every other crate: arms and colors, the
//! queue/settings/intersection state aggregates, phase timing, audit records
//! and the JSON payload schemas exchanged over the bus.

mod arm;
mod audit;
mod intersection;
mod payload;
mod phase;
mod queues;
mod settings;
mod signal;

pub use arm::Arm;
pub use audit::{AuditAction, AuditRecord};
pub use intersection::{IntersectionState, SchedulerPhase, Snapshot};
pub use payload::{
    AdvisoryAction, AdvisoryReason, AdvisorySignal, CorridorAdvisory, CorridorTelemetry,
    GovernorCommand, HardwareStatus, ProximityReport, QueueReport, SignalCommand,
};
pub use phase::{
    PhaseDecision, PhaseTiming, BASE_GREEN_SECS, CLEARANCE_SECS, EMERGENCY_HOLD_SECS,
    MAX_GREEN_SECS, MIN_GREEN_SECS, QUEUE_WEIGHT_HALFSECS,
};
pub use queues::QueueState;
pub use settings::{SettingsState, SettingsUpdate};
pub use signal::SignalColor;
