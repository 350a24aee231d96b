//! Logical bus channels and their topic bindings.
//!
//! The controller never deals in raw topic strings. A [`TopicMap`] is
//! resolved once at startup and translates between topics and [`Channel`]s
//! in both directions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A logical bus channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    // Inbound
    Arrival,
    Departure,
    HardwareStatus,
    Settings,
    EmergencyProximity,
    QueueReport,
    CorridorTelemetry,

    // Outbound
    SignalCommand,
    GovernorCommand,
    StateSnapshot,
    CorridorAdvisory,
}

impl Channel {
    /// Channels the controller subscribes to.
    pub const INBOUND: [Channel; 7] = [
        Channel::Arrival,
        Channel::Departure,
        Channel::HardwareStatus,
        Channel::Settings,
        Channel::EmergencyProximity,
        Channel::QueueReport,
        Channel::CorridorTelemetry,
    ];

    /// Channels the controller publishes on.
    pub const OUTBOUND: [Channel; 4] = [
        Channel::SignalCommand,
        Channel::GovernorCommand,
        Channel::StateSnapshot,
        Channel::CorridorAdvisory,
    ];

    pub fn is_inbound(self) -> bool {
        Self::INBOUND.contains(&self)
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Arrival => "arrival",
            Channel::Departure => "departure",
            Channel::HardwareStatus => "hardware-status",
            Channel::Settings => "settings",
            Channel::EmergencyProximity => "emergency-proximity",
            Channel::QueueReport => "queue-report",
            Channel::CorridorTelemetry => "corridor-telemetry",
            Channel::SignalCommand => "signal-command",
            Channel::GovernorCommand => "governor-command",
            Channel::StateSnapshot => "state-snapshot",
            Channel::CorridorAdvisory => "corridor-advisory",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Topic string bound to each channel.
///
/// Defaults match the field deployment's broker layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicMap {
    pub arrival: String,
    pub departure: String,
    pub hardware_status: String,
    pub settings: String,
    pub emergency_proximity: String,
    pub queue_report: String,
    pub corridor_telemetry: String,
    pub signal_command: String,
    pub governor_command: String,
    pub state_snapshot: String,
    pub corridor_advisory: String,
}

impl Default for TopicMap {
    fn default() -> Self {
        Self {
            arrival: "road/in".into(),
            departure: "road/out".into(),
            hardware_status: "city/status".into(),
            settings: "city/settings".into(),
            emergency_proximity: "v2i/ambulance/gps".into(),
            queue_report: "city/queues".into(),
            corridor_telemetry: "sensor/road1/data".into(),
            signal_command: "city/signal".into(),
            governor_command: "city/governor".into(),
            state_snapshot: "city/dashboard/state".into(),
            corridor_advisory: "control/road1/cmd".into(),
        }
    }
}

impl TopicMap {
    /// Topic bound to `channel`.
    pub fn topic(&self, channel: Channel) -> &str {
        match channel {
            Channel::Arrival => &self.arrival,
            Channel::Departure => &self.departure,
            Channel::HardwareStatus => &self.hardware_status,
            Channel::Settings => &self.settings,
            Channel::EmergencyProximity => &self.emergency_proximity,
            Channel::QueueReport => &self.queue_report,
            Channel::CorridorTelemetry => &self.corridor_telemetry,
            Channel::SignalCommand => &self.signal_command,
            Channel::GovernorCommand => &self.governor_command,
            Channel::StateSnapshot => &self.state_snapshot,
            Channel::CorridorAdvisory => &self.corridor_advisory,
        }
    }

    /// Resolve an inbound topic. Outbound topics never resolve, so the
    /// controller ignores its own publications on a shared bus.
    pub fn inbound_channel(&self, topic: &str) -> Option<Channel> {
        Channel::INBOUND
            .into_iter()
            .find(|&channel| self.topic(channel) == topic)
    }

    /// Topics to subscribe to on the bus.
    pub fn subscriptions(&self) -> Vec<&str> {
        Channel::INBOUND
            .into_iter()
            .map(|channel| self.topic(channel))
            .collect()
    }
}
