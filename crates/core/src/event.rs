//! Inbound events.

use itms_types::{CorridorTelemetry, QueueReport, SettingsUpdate};

/// Events delivered to the controller state machine.
///
/// Each event corresponds to exactly one successfully decoded bus message.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A vehicle joined the North queue.
    VehicleArrived,

    /// A vehicle left the North queue.
    VehicleDeparted,

    /// The signal hardware finished the physical North phase.
    HardwareCycleComplete,

    /// Operator changed governor settings.
    SettingsChanged(SettingsUpdate),

    /// Emergency vehicle distance report.
    EmergencyProximity { distance_meters: f64 },

    /// External count for one arm.
    QueueReported(QueueReport),

    /// Corridor sensor aggregate.
    CorridorTelemetry(CorridorTelemetry),
}

impl Event {
    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::VehicleArrived => "VehicleArrived",
            Event::VehicleDeparted => "VehicleDeparted",
            Event::HardwareCycleComplete => "HardwareCycleComplete",
            Event::SettingsChanged(_) => "SettingsChanged",
            Event::EmergencyProximity { .. } => "EmergencyProximity",
            Event::QueueReported(_) => "QueueReported",
            Event::CorridorTelemetry(_) => "CorridorTelemetry",
        }
    }
}
