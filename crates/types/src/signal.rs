//! Signal head colors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Color shown to the active arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalColor {
    Red,
    Yellow,
    Green,
}

impl SignalColor {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalColor::Red => "RED",
            SignalColor::Yellow => "YELLOW",
            SignalColor::Green => "GREEN",
        }
    }
}

impl fmt::Display for SignalColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
