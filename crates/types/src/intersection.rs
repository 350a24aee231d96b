//! Intersection state and dashboard snapshots.

use crate::{Arm, QueueState, SignalColor};
use serde::{Deserialize, Serialize};

/// Coarse scheduler state derived from [`IntersectionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// North holds the intersection on red, waiting for demand.
    NorthRed,
    /// North has right-of-way (demand-actuated or emergency hold).
    NorthGreen,
    /// The secondary-arm cycle is in flight.
    Cycling,
}

/// Right-of-way state of the intersection.
///
/// Only one arm is ever "active"; `color` applies to that arm and every other
/// arm is implicitly red, so at most one arm can be green.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionState {
    pub active_arm: Arm,
    pub color: SignalColor,
    /// Single-flight latch for the secondary-arm cycle.
    pub is_cycling: bool,
    pub emergency_active: bool,
}

impl Default for IntersectionState {
    fn default() -> Self {
        Self {
            active_arm: Arm::North,
            color: SignalColor::Red,
            is_cycling: false,
            emergency_active: false,
        }
    }
}

impl IntersectionState {
    /// The arm currently showing green, if any.
    pub fn green_arm(&self) -> Option<Arm> {
        (self.color == SignalColor::Green).then_some(self.active_arm)
    }

    /// Whether North is parked on red with no cycle running.
    pub fn is_north_idle(&self) -> bool {
        self.active_arm == Arm::North && self.color == SignalColor::Red && !self.is_cycling
    }

    pub fn phase(&self) -> SchedulerPhase {
        if self.is_cycling {
            SchedulerPhase::Cycling
        } else if self.active_arm == Arm::North && self.color == SignalColor::Green {
            SchedulerPhase::NorthGreen
        } else {
            SchedulerPhase::NorthRed
        }
    }
}

/// State published to the dashboard after every decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub active_arm: Arm,
    pub color: SignalColor,
    pub queues: QueueState,
    pub emergency: bool,
}

impl Snapshot {
    pub fn capture(state: &IntersectionState, queues: &QueueState) -> Self {
        Self {
            active_arm: state.active_arm,
            color: state.color,
            queues: *queues,
            emergency: state.emergency_active,
        }
    }
}
