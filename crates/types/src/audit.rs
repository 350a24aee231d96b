//! Audit trail records.

use crate::AdvisoryAction;
use std::fmt;
use std::time::Duration;

/// Decision recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// North granted a demand-actuated green.
    NorthGreen,
    /// Emergency preemption forced North green.
    Emergency,
    /// Operator settings changed.
    Settings,
    /// Corridor advisory issued.
    Advisory(AdvisoryAction),
}

impl AuditAction {
    /// Label written to the audit file.
    pub fn label(self) -> &'static str {
        match self {
            AuditAction::NorthGreen => "SYS_1_NORTH_GREEN",
            AuditAction::Emergency => "SYS_2_EMERGENCY",
            AuditAction::Settings => "SYS_3_SETTINGS",
            AuditAction::Advisory(action) => action.as_str(),
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One immutable row of the audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    /// Wall-clock time of the decision, as a duration since the Unix epoch.
    pub timestamp: Duration,
    pub action: AuditAction,
    pub payload: serde_json::Value,
}

impl AuditRecord {
    pub fn new(timestamp: Duration, action: AuditAction, payload: serde_json::Value) -> Self {
        Self {
            timestamp,
            action,
            payload,
        }
    }
}
