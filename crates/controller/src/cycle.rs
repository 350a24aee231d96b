//! Secondary-cycle step results.

use itms_core::Action;
use itms_types::PhaseDecision;

/// Outcome of one phase boundary in the secondary cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleStep {
    /// Phase granted. Execute `actions`, then wait `decision.duration()`.
    Hold {
        decision: PhaseDecision,
        actions: Vec<Action>,
    },

    /// Arm has no queue; move on without waiting.
    Skip,

    /// Emergency (or a lost latch): stop iterating and finish the cycle.
    Abort,
}

impl CycleStep {
    pub fn is_abort(&self) -> bool {
        matches!(self, CycleStep::Abort)
    }
}
