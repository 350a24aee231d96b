//! Intersection arms.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One approach of the four-arm intersection.
///
/// North is the demand-actuated primary arm. The other three are secondary
/// arms served by the round-robin cycle in [`Arm::SECONDARY`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Arm {
    North,
    East,
    South,
    West,
}

impl Arm {
    /// Secondary arms in cycling order.
    pub const SECONDARY: [Arm; 3] = [Arm::East, Arm::South, Arm::West];

    /// Whether this is the demand-actuated primary arm.
    pub fn is_primary(self) -> bool {
        self == Arm::North
    }

    /// Name as used on the wire and in snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Arm::North => "North",
            Arm::East => "East",
            Arm::South => "South",
            Arm::West => "West",
        }
    }
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
