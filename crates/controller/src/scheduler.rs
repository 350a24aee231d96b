//! Phase scheduler for the four-arm intersection.
//!
//! # States
//!
//! ```text
//!              arrival (North > 0)
//!   NorthRed ───────────────────────► NorthGreen
//!      ▲  ▲                               │
//!      │  │ cycle finished                │ hardware cycle complete
//!      │  │ (re-enter NorthGreen          ▼
//!      │  │  if North > 0)          NorthRed (latch set)
//!      │  └──────────── Cycling ◄─────────┘
//!      │                  East → South → West
//!      │                  Green(queue) → Yellow(2s), empty arms skipped
//! ```
//!
//! The secondary cycle itself runs outside the state machine (it has to
//! wait). The runner drives it through [`PhaseScheduler::begin_green`],
//! [`PhaseScheduler::begin_clearance`] and [`PhaseScheduler::finish_cycle`],
//! one call per phase boundary. Each boundary call re-checks the emergency
//! flag, so preemption is honored at the next boundary at the latest.

use crate::CycleStep;
use itms_core::{Action, OutboundMessage};
use itms_types::{
    Arm, AuditAction, AuditRecord, IntersectionState, PhaseDecision, PhaseTiming, QueueState,
    SignalColor, SignalCommand, Snapshot,
};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// Owner of the right-of-way state.
#[derive(Debug)]
pub struct PhaseScheduler {
    timing: PhaseTiming,

    state: IntersectionState,

    /// An emergency override fired while the current cycle was in flight.
    ///
    /// Sticky until the cycle finishes: once the override has taken the
    /// intersection, the cycle must not grab it back even if the emergency
    /// clears before the next boundary.
    cycle_preempted: bool,
}

impl PhaseScheduler {
    /// Create a scheduler with North parked on red.
    pub fn new(timing: PhaseTiming) -> Self {
        Self {
            timing,
            state: IntersectionState::default(),
            cycle_preempted: false,
        }
    }

    pub fn state(&self) -> &IntersectionState {
        &self.state
    }

    /// Publish action for the current dashboard snapshot.
    pub fn snapshot(&self, queues: &QueueState) -> Action {
        Action::Publish(OutboundMessage::Snapshot(Snapshot::capture(
            &self.state,
            queues,
        )))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Primary arm
    // ═══════════════════════════════════════════════════════════════════════

    /// Wake North after an arrival if the intersection is idle.
    ///
    /// Only fires from `NorthRed` with no cycle in flight and no emergency.
    pub fn on_arrival(&mut self, queues: &QueueState, now: Duration) -> Vec<Action> {
        if !self.state.is_north_idle() || self.state.emergency_active {
            debug!(
                phase = ?self.state.phase(),
                emergency = self.state.emergency_active,
                "Arrival does not wake North"
            );
            return vec![];
        }
        if queues.north() == 0 {
            return vec![];
        }
        self.grant_north(queues, now)
    }

    /// North's physical phase finished: hand over to the secondary cycle.
    ///
    /// Checks and sets the cycling latch in one step. Duplicate completions
    /// while a cycle is in flight are ignored, as are completions during an
    /// emergency.
    pub fn on_hardware_cycle_complete(&mut self, queues: &QueueState) -> Vec<Action> {
        if self.state.is_cycling {
            debug!("Duplicate cycle completion ignored, cycle already running");
            return vec![];
        }
        if self.state.emergency_active {
            debug!("Cycle completion ignored during emergency");
            return vec![];
        }
        if self.state.active_arm != Arm::North {
            debug!(arm = %self.state.active_arm, "Cycle completion ignored, North not active");
            return vec![];
        }

        self.state.color = SignalColor::Red;
        self.state.is_cycling = true;
        self.cycle_preempted = false;

        info!("North phase complete, starting secondary cycle");
        vec![self.snapshot(queues), Action::StartCycle]
    }

    /// Give North a demand-sized green.
    fn grant_north(&mut self, queues: &QueueState, now: Duration) -> Vec<Action> {
        let queue = queues.north();
        let decision = PhaseDecision::green_for(Arm::North, queue, &self.timing);

        self.state.active_arm = Arm::North;
        self.state.color = SignalColor::Green;

        info!(
            queue = queue,
            duration_secs = decision.duration_secs,
            "North green"
        );

        vec![
            Action::Publish(OutboundMessage::Signal(SignalCommand::from(decision))),
            Action::AppendAudit(AuditRecord::new(
                now,
                AuditAction::NorthGreen,
                json!({ "duration": decision.duration_secs, "queue": queue }),
            )),
            self.snapshot(queues),
        ]
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Secondary cycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Phase-start boundary for a secondary arm.
    pub fn begin_green(&mut self, arm: Arm, queues: &QueueState) -> CycleStep {
        if let Some(step) = self.boundary_check() {
            return step;
        }

        let queue = queues.get(arm);
        if queue == 0 {
            debug!(arm = %arm, "Skipping empty arm");
            return CycleStep::Skip;
        }

        let decision = PhaseDecision::green_for(arm, queue, &self.timing);
        self.state.active_arm = arm;
        self.state.color = SignalColor::Green;

        info!(
            arm = %arm,
            queue = queue,
            duration_secs = decision.duration_secs,
            "Secondary green"
        );

        CycleStep::Hold {
            decision,
            actions: vec![self.snapshot(queues)],
        }
    }

    /// Green-end boundary: switch `arm` to its yellow clearance.
    pub fn begin_clearance(&mut self, arm: Arm, queues: &QueueState) -> CycleStep {
        if let Some(step) = self.boundary_check() {
            return step;
        }
        if self.state.active_arm != arm {
            debug!(arm = %arm, active = %self.state.active_arm, "Clearance for inactive arm");
            return CycleStep::Abort;
        }

        self.state.color = SignalColor::Yellow;
        debug!(arm = %arm, "Secondary yellow");

        CycleStep::Hold {
            decision: PhaseDecision::clearance_for(arm, &self.timing),
            actions: vec![self.snapshot(queues)],
        }
    }

    /// Return control to North after the cycle completed or aborted.
    ///
    /// Releases the latch. North goes back to red and, if vehicles are
    /// waiting and no emergency is active, straight into a new green. While
    /// an emergency is active the override's North green is left in place
    /// instead of going to red, so an emergency always shows North green.
    pub fn finish_cycle(&mut self, queues: &QueueState, now: Duration) -> Vec<Action> {
        if !self.state.is_cycling {
            debug!("No cycle to finish");
            return vec![];
        }
        self.state.is_cycling = false;
        let preempted = std::mem::take(&mut self.cycle_preempted);

        if self.state.emergency_active {
            info!("Cycle aborted, emergency hold stays on North");
            return vec![self.snapshot(queues)];
        }

        self.state.active_arm = Arm::North;
        self.state.color = SignalColor::Red;
        info!(preempted = preempted, "Cycle finished, control back to North");

        let mut actions = vec![self.snapshot(queues)];
        if queues.north() > 0 {
            actions.extend(self.grant_north(queues, now));
        }
        actions
    }

    fn boundary_check(&self) -> Option<CycleStep> {
        if !self.state.is_cycling {
            debug!("Cycle step without a running cycle");
            return Some(CycleStep::Abort);
        }
        if self.state.emergency_active || self.cycle_preempted {
            info!("Cycle aborted by emergency");
            return Some(CycleStep::Abort);
        }
        None
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Emergency hooks
    // ═══════════════════════════════════════════════════════════════════════

    /// Record the latest emergency flag.
    pub(crate) fn set_emergency(&mut self, active: bool) {
        self.state.emergency_active = active;
    }

    /// Take the intersection for an emergency: North green, whatever runs.
    pub(crate) fn force_emergency_hold(&mut self) -> PhaseDecision {
        if self.state.is_cycling {
            self.cycle_preempted = true;
        }
        self.state.active_arm = Arm::North;
        self.state.color = SignalColor::Green;
        PhaseDecision::emergency_hold(&self.timing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itms_test_helpers::{audit_actions, green, last_head, queues, signal_commands, starts_cycle};
    use itms_types::SchedulerPhase;
    use tracing_test::traced_test;

    const T0: Duration = Duration::from_secs(1_700_000_000);

    fn scheduler() -> PhaseScheduler {
        PhaseScheduler::new(PhaseTiming::default())
    }

    fn hold_secs(step: &CycleStep) -> Option<u32> {
        match step {
            CycleStep::Hold { decision, .. } => Some(decision.duration_secs),
            _ => None,
        }
    }

    #[test]
    fn test_arrival_wakes_idle_north() {
        let mut sched = scheduler();
        let q = queues(4, 0, 0, 0);

        let actions = sched.on_arrival(&q, T0);

        assert_eq!(signal_commands(&actions), vec![green(13)]);
        assert_eq!(audit_actions(&actions), vec![AuditAction::NorthGreen]);
        assert_eq!(last_head(&actions), Some((Arm::North, SignalColor::Green)));
        assert_eq!(sched.state().phase(), SchedulerPhase::NorthGreen);
    }

    #[test]
    fn test_arrival_while_green_is_noop() {
        let mut sched = scheduler();
        let q = queues(1, 0, 0, 0);
        sched.on_arrival(&q, T0);

        let actions = sched.on_arrival(&queues(2, 0, 0, 0), T0);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_arrival_during_emergency_is_noop() {
        let mut sched = scheduler();
        sched.set_emergency(true);
        assert!(sched.on_arrival(&queues(3, 0, 0, 0), T0).is_empty());
    }

    #[test]
    fn test_cycle_complete_sets_latch_once() {
        let mut sched = scheduler();
        let q = queues(1, 0, 3, 2);
        sched.on_arrival(&q, T0);

        let first = sched.on_hardware_cycle_complete(&q);
        assert!(starts_cycle(&first));
        assert_eq!(last_head(&first), Some((Arm::North, SignalColor::Red)));
        assert!(sched.state().is_cycling);

        let second = sched.on_hardware_cycle_complete(&q);
        assert!(second.is_empty());
    }

    #[traced_test]
    #[test]
    fn test_cycle_complete_ignored_during_emergency() {
        let mut sched = scheduler();
        sched.set_emergency(true);
        sched.force_emergency_hold();
        assert!(sched
            .on_hardware_cycle_complete(&queues(0, 1, 1, 1))
            .is_empty());
        assert!(logs_contain("Cycle completion ignored during emergency"));
    }

    #[test]
    fn test_full_cycle_skips_empty_arm() {
        let mut sched = scheduler();
        let q = queues(0, 0, 3, 2);
        sched.on_hardware_cycle_complete(&q);

        assert!(matches!(sched.begin_green(Arm::East, &q), CycleStep::Skip));

        let south = sched.begin_green(Arm::South, &q);
        assert_eq!(hold_secs(&south), Some(10));
        assert_eq!(sched.state().green_arm(), Some(Arm::South));
        assert_eq!(hold_secs(&sched.begin_clearance(Arm::South, &q)), Some(2));
        assert_eq!(sched.state().color, SignalColor::Yellow);

        let west = sched.begin_green(Arm::West, &q);
        assert_eq!(hold_secs(&west), Some(8));
        assert_eq!(hold_secs(&sched.begin_clearance(Arm::West, &q)), Some(2));

        let actions = sched.finish_cycle(&q, T0);
        assert_eq!(last_head(&actions), Some((Arm::North, SignalColor::Red)));
        assert!(signal_commands(&actions).is_empty());
        assert_eq!(sched.state().phase(), SchedulerPhase::NorthRed);
    }

    #[test]
    fn test_finish_cycle_reenters_north_green_with_demand() {
        let mut sched = scheduler();
        let q = queues(2, 0, 0, 0);
        sched.on_hardware_cycle_complete(&q);

        let actions = sched.finish_cycle(&q, T0);
        assert_eq!(signal_commands(&actions), vec![green(8)]);
        assert_eq!(last_head(&actions), Some((Arm::North, SignalColor::Green)));
        assert!(!sched.state().is_cycling);
    }

    #[test]
    fn test_emergency_aborts_at_next_boundary() {
        let mut sched = scheduler();
        let q = queues(0, 0, 3, 2);
        sched.on_hardware_cycle_complete(&q);
        assert!(hold_secs(&sched.begin_green(Arm::South, &q)).is_some());

        sched.set_emergency(true);
        sched.force_emergency_hold();

        assert!(matches!(
            sched.begin_clearance(Arm::South, &q),
            CycleStep::Abort
        ));
        let actions = sched.finish_cycle(&q, T0);
        assert_eq!(last_head(&actions), Some((Arm::North, SignalColor::Green)));
        assert!(!sched.state().is_cycling);
    }

    #[test]
    fn test_cleared_emergency_still_aborts_preempted_cycle() {
        let mut sched = scheduler();
        let q = queues(0, 2, 2, 0);
        sched.on_hardware_cycle_complete(&q);
        sched.begin_green(Arm::East, &q);

        sched.set_emergency(true);
        sched.force_emergency_hold();
        sched.set_emergency(false);

        assert!(matches!(sched.begin_clearance(Arm::East, &q), CycleStep::Abort));
        assert_eq!(sched.state().green_arm(), Some(Arm::North));
    }

    #[test]
    fn test_steps_without_cycle_abort() {
        let mut sched = scheduler();
        let q = queues(0, 5, 5, 5);
        assert!(matches!(sched.begin_green(Arm::East, &q), CycleStep::Abort));
        assert!(sched.finish_cycle(&q, T0).is_empty());
    }
}
