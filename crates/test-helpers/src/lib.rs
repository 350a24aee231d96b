//! Test helpers for ITMS.
//!
//! Fixture builders and small extractors that pull typed outputs back out of
//! the `Vec<Action>` returned by the controller.

use itms_core::{Action, OutboundMessage};
use itms_types::{
    Arm, AuditAction, AuditRecord, GovernorCommand, QueueState, SignalColor,
    SignalCommand, Snapshot,
};

/// Queue state from counts in `[North, East, South, West]` order.
pub fn queues(north: u32, east: u32, south: u32, west: u32) -> QueueState {
    QueueState::new(north, east, south, west)
}

/// Signal commands, in order.
pub fn signal_commands(actions: &[Action]) -> Vec<SignalCommand> {
    actions
        .iter()
        .filter_map(|action| match action.as_published() {
            Some(OutboundMessage::Signal(cmd)) => Some(*cmd),
            _ => None,
        })
        .collect()
}

/// Governor commands, in order.
pub fn governor_commands(actions: &[Action]) -> Vec<GovernorCommand> {
    actions
        .iter()
        .filter_map(|action| match action.as_published() {
            Some(OutboundMessage::Governor(cmd)) => Some(*cmd),
            _ => None,
        })
        .collect()
}

/// Dashboard snapshots, in order.
pub fn snapshots(actions: &[Action]) -> Vec<Snapshot> {
    actions
        .iter()
        .filter_map(|action| match action.as_published() {
            Some(OutboundMessage::Snapshot(snapshot)) => Some(snapshot.clone()),
            _ => None,
        })
        .collect()
}

/// Audit records, in order.
pub fn audit_records(actions: &[Action]) -> Vec<AuditRecord> {
    actions
        .iter()
        .filter_map(|action| match action {
            Action::AppendAudit(record) => Some(record.clone()),
            _ => None,
        })
        .collect()
}

/// Audit labels, in order.
pub fn audit_actions(actions: &[Action]) -> Vec<AuditAction> {
    audit_records(actions)
        .into_iter()
        .map(|record| record.action)
        .collect()
}

/// Whether the actions ask the runner to launch the cycle.
pub fn starts_cycle(actions: &[Action]) -> bool {
    actions.iter().any(|action| matches!(action, Action::StartCycle))
}

/// Shorthand for a green signal command.
pub fn green(duration: u32) -> SignalCommand {
    SignalCommand {
        color: SignalColor::Green,
        duration,
    }
}

/// `(arm, color)` of the last snapshot, if any.
pub fn last_head(actions: &[Action]) -> Option<(Arm, SignalColor)> {
    snapshots(actions)
        .last()
        .map(|snapshot| (snapshot.active_arm, snapshot.color))
}
