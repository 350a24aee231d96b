//! Outbound message types for bus publication.

use crate::Channel;
use itms_types::{CorridorAdvisory, GovernorCommand, SignalCommand, Snapshot};

/// Outbound bus messages.
///
/// These are the messages the controller publishes. The runner handles
/// encoding and the actual transport I/O.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    // ═══════════════════════════════════════════════════════════════════════
    // Intersection
    // ═══════════════════════════════════════════════════════════════════════
    /// Right-of-way command for the signal hardware.
    Signal(SignalCommand),

    /// Dashboard snapshot of the intersection.
    Snapshot(Snapshot),

    // ═══════════════════════════════════════════════════════════════════════
    // Speed control
    // ═══════════════════════════════════════════════════════════════════════
    /// Speed governor output level.
    Governor(GovernorCommand),

    /// Upstream corridor speed advisory.
    Advisory(CorridorAdvisory),
}

impl OutboundMessage {
    /// Get a human-readable name for this message type.
    pub fn type_name(&self) -> &'static str {
        match self {
            OutboundMessage::Signal(_) => "Signal",
            OutboundMessage::Snapshot(_) => "Snapshot",
            OutboundMessage::Governor(_) => "Governor",
            OutboundMessage::Advisory(_) => "Advisory",
        }
    }

    /// Channel this message is published on.
    pub fn channel(&self) -> Channel {
        match self {
            OutboundMessage::Signal(_) => Channel::SignalCommand,
            OutboundMessage::Snapshot(_) => Channel::StateSnapshot,
            OutboundMessage::Governor(_) => Channel::GovernorCommand,
            OutboundMessage::Advisory(_) => Channel::CorridorAdvisory,
        }
    }
}
