//! Per-arm vehicle queues.

use crate::Arm;
use serde::{Deserialize, Serialize};

/// Vehicle count waiting on each arm.
///
/// The North count is owned by the controller (arrival/departure events).
/// Secondary counts come from an external source of truth and are only read
/// by the scheduler.
///
/// Serializes as `{"North": n, "East": n, "South": n, "West": n}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueState {
    #[serde(rename = "North", default)]
    north: u32,
    #[serde(rename = "East", default)]
    east: u32,
    #[serde(rename = "South", default)]
    south: u32,
    #[serde(rename = "West", default)]
    west: u32,
}

impl QueueState {
    /// Create a queue state with explicit counts.
    pub fn new(north: u32, east: u32, south: u32, west: u32) -> Self {
        Self {
            north,
            east,
            south,
            west,
        }
    }

    /// Baseline used by the field deployment: one car waiting East, two West.
    pub fn baseline() -> Self {
        Self::new(0, 1, 0, 2)
    }

    /// Vehicles waiting on `arm`.
    pub fn get(&self, arm: Arm) -> u32 {
        match arm {
            Arm::North => self.north,
            Arm::East => self.east,
            Arm::South => self.south,
            Arm::West => self.west,
        }
    }

    /// Overwrite the count for `arm`.
    pub fn set(&mut self, arm: Arm, count: u32) {
        *self.slot_mut(arm) = count;
    }

    /// Register one more vehicle on `arm`. Returns the new count.
    pub fn increment(&mut self, arm: Arm) -> u32 {
        let slot = self.slot_mut(arm);
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Remove one vehicle from `arm`, floored at zero. Returns the new count.
    pub fn decrement(&mut self, arm: Arm) -> u32 {
        let slot = self.slot_mut(arm);
        *slot = slot.saturating_sub(1);
        *slot
    }

    /// Shorthand for the primary arm's count.
    pub fn north(&self) -> u32 {
        self.north
    }

    fn slot_mut(&mut self, arm: Arm) -> &mut u32 {
        match arm {
            Arm::North => &mut self.north,
            Arm::East => &mut self.east,
            Arm::South => &mut self.south,
            Arm::West => &mut self.west,
        }
    }
}
