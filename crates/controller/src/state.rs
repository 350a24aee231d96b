//! Combined intersection controller state machine.

use crate::{advise, ControllerConfig, CycleStep, EmergencyPreemption, PhaseScheduler};
use itms_core::{Action, Event, OutboundMessage, StateMachine};
use itms_governor::GovernorConfig;
use itms_types::{
    Arm, AuditAction, AuditRecord, CorridorTelemetry, IntersectionState, QueueReport, QueueState,
    SettingsState, SettingsUpdate, Snapshot,
};
use std::time::Duration;
use tracing::{debug, info};

/// The intersection controller.
///
/// Single owner of queue, settings and intersection state. The runner keeps
/// it behind one lock; every read and write from the dispatch context and the
/// secondary-cycle task goes through it.
pub struct IntersectionController {
    queues: QueueState,

    settings: SettingsState,

    scheduler: PhaseScheduler,

    preemption: EmergencyPreemption,

    governor: GovernorConfig,

    /// Wall-clock time since the Unix epoch, set by the runner.
    now: Duration,
}

impl IntersectionController {
    /// Create a controller in `NorthRed` with the configured queues.
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            queues: config.initial_queues,
            settings: SettingsState::default(),
            scheduler: PhaseScheduler::new(config.timing),
            preemption: EmergencyPreemption::new(config.emergency_radius_m),
            governor: config.governor,
            now: Duration::ZERO,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn queues(&self) -> &QueueState {
        &self.queues
    }

    pub fn settings(&self) -> &SettingsState {
        &self.settings
    }

    pub fn state(&self) -> &IntersectionState {
        self.scheduler.state()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self.scheduler.state(), &self.queues)
    }

    /// Current governor output.
    pub fn governor_output(&self) -> u8 {
        self.governor.command(&self.queues, &self.settings).pwm
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Secondary cycle entry points
    // ═══════════════════════════════════════════════════════════════════════

    /// Phase-start boundary for `arm`. See [`PhaseScheduler::begin_green`].
    pub fn begin_secondary_green(&mut self, arm: Arm) -> CycleStep {
        self.scheduler.begin_green(arm, &self.queues)
    }

    /// Green-end boundary for `arm`. See [`PhaseScheduler::begin_clearance`].
    pub fn begin_secondary_clearance(&mut self, arm: Arm) -> CycleStep {
        self.scheduler.begin_clearance(arm, &self.queues)
    }

    /// End of the cycle. See [`PhaseScheduler::finish_cycle`].
    pub fn finish_cycle(&mut self) -> Vec<Action> {
        self.scheduler.finish_cycle(&self.queues, self.now)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Event handlers
    // ═══════════════════════════════════════════════════════════════════════

    fn on_vehicle_arrived(&mut self) -> Vec<Action> {
        let queue = self.queues.increment(Arm::North);
        debug!(queue = queue, "Vehicle arrived");

        let mut actions = vec![self.governor_action(), self.scheduler.snapshot(&self.queues)];
        actions.extend(self.scheduler.on_arrival(&self.queues, self.now));
        actions
    }

    fn on_vehicle_departed(&mut self) -> Vec<Action> {
        let queue = self.queues.decrement(Arm::North);
        debug!(queue = queue, "Vehicle departed");

        vec![self.governor_action(), self.scheduler.snapshot(&self.queues)]
    }

    fn on_settings_changed(&mut self, update: SettingsUpdate) -> Vec<Action> {
        self.settings.apply(&update);
        info!(
            danger = self.settings.danger,
            manual_limit = self.settings.manual_limit,
            "Settings changed"
        );

        vec![
            self.governor_action(),
            Action::AppendAudit(AuditRecord::new(
                self.now,
                AuditAction::Settings,
                serde_json::to_value(&update).unwrap_or_default(),
            )),
        ]
    }

    fn on_queue_reported(&mut self, report: QueueReport) -> Vec<Action> {
        if report.arm.is_primary() {
            debug!(count = report.count, "Ignoring external North count");
            return vec![];
        }
        self.queues.set(report.arm, report.count);
        debug!(arm = %report.arm, count = report.count, "Queue reported");

        vec![self.scheduler.snapshot(&self.queues)]
    }

    fn on_corridor_telemetry(&mut self, telemetry: CorridorTelemetry) -> Vec<Action> {
        let advisory = advise(&telemetry);
        debug!(
            vehicle_count = telemetry.vehicle_count,
            avg_speed = telemetry.avg_speed,
            action = advisory.action.as_str(),
            "Corridor advisory"
        );

        vec![
            Action::Publish(OutboundMessage::Advisory(advisory)),
            Action::AppendAudit(AuditRecord::new(
                self.now,
                AuditAction::Advisory(advisory.action),
                serde_json::to_value(advisory).unwrap_or_default(),
            )),
        ]
    }

    fn governor_action(&self) -> Action {
        Action::Publish(OutboundMessage::Governor(
            self.governor.command(&self.queues, &self.settings),
        ))
    }
}

impl StateMachine for IntersectionController {
    fn handle(&mut self, event: Event) -> Vec<Action> {
        match event {
            Event::VehicleArrived => self.on_vehicle_arrived(),
            Event::VehicleDeparted => self.on_vehicle_departed(),
            Event::HardwareCycleComplete => self.scheduler.on_hardware_cycle_complete(&self.queues),
            Event::SettingsChanged(update) => self.on_settings_changed(update),
            Event::EmergencyProximity { distance_meters } => self.preemption.on_proximity(
                distance_meters,
                &mut self.scheduler,
                &self.queues,
                self.now,
            ),
            Event::QueueReported(report) => self.on_queue_reported(report),
            Event::CorridorTelemetry(telemetry) => self.on_corridor_telemetry(telemetry),
        }
    }

    fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    fn now(&self) -> Duration {
        self.now
    }
}

impl std::fmt::Debug for IntersectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntersectionController")
            .field("queues", &self.queues)
            .field("settings", &self.settings)
            .field("state", self.scheduler.state())
            .finish()
    }
}
