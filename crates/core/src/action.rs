//! Actions returned by state machines.

use crate::OutboundMessage;
use itms_types::AuditRecord;

/// Side effects requested by the controller.
///
/// The runner executes actions in the order they were returned. Failures of
/// any action are logged and never fed back into the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Publish a message on its outbound channel.
    Publish(OutboundMessage),

    /// Append a record to the audit trail.
    AppendAudit(AuditRecord),

    /// Launch the secondary-arm cycle task.
    ///
    /// Only returned after the cycling latch has been set, so the runner can
    /// spawn unconditionally.
    StartCycle,
}

impl Action {
    /// Get a human-readable name for this action type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::Publish(message) => message.type_name(),
            Action::AppendAudit(_) => "AppendAudit",
            Action::StartCycle => "StartCycle",
        }
    }

    /// The published message, if this is a publish action.
    pub fn as_published(&self) -> Option<&OutboundMessage> {
        match self {
            Action::Publish(message) => Some(message),
            _ => None,
        }
    }
}
