//! Operator settings.

use serde::{Deserialize, Serialize};

/// Operator-controlled inputs to the speed governor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsState {
    /// Danger override engaged from the dashboard.
    pub danger: bool,
    /// Upper bound on governor output.
    pub manual_limit: u8,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            danger: false,
            manual_limit: u8::MAX,
        }
    }
}

impl SettingsState {
    /// Merge a partial update. Fields absent from the update are kept.
    ///
    /// `manual_limit` values outside `0..=255` are clamped into range.
    pub fn apply(&mut self, update: &SettingsUpdate) {
        if let Some(danger) = update.danger {
            self.danger = danger;
        }
        if let Some(limit) = update.manual_limit {
            self.manual_limit = limit.clamp(0, u8::MAX as i64) as u8;
        }
    }
}

/// Partial settings change as received from the dashboard.
///
/// Keys the governor does not use are kept in `extra` so the audit trail
/// records the payload as sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danger: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_limit: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
