//! Production runner for the intersection controller.
//!
//! ```text
//!  bus ──► mpsc ──► ControllerRunner::run ──► dispatch ──┐
//!                                                        ▼
//!                            ┌──────── Mutex<IntersectionController> ────────┐
//!                            │  set_time → handle → execute actions (locked) │
//!                            └──────────────────────▲────────────────────────┘
//!                                                   │ cycle steps
//!                                spawned on StartCycle: secondary cycle task
//! ```
//!
//! Actions are executed while the controller lock is held, so outbound
//! messages and audit rows appear in the order decisions were committed. The
//! lock is never held across an `.await`.

use crate::audit::AuditSink;
use crate::cycle::run_cycle;
use crate::network::{decode_event, encode_message, BusMessage, Transport};
use itms_controller::{ControllerConfig, CycleStep, IntersectionController};
use itms_core::{Action, Event, OutboundMessage, StateMachine, TopicMap};
use itms_types::{AuditRecord, Snapshot};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// State shared between the dispatch context and the cycle task.
pub(crate) struct Shared {
    controller: Mutex<IntersectionController>,
    transport: Arc<dyn Transport>,
    audit: Arc<dyn AuditSink>,
    topics: TopicMap,
    pub(crate) shutdown: CancellationToken,
}

impl Shared {
    /// Feed one event through the controller and execute the result.
    fn handle(self: &Arc<Self>, event: Event) {
        let mut controller = self.controller.lock();
        controller.set_time(wall_clock());
        let actions = controller.handle(event);
        self.execute(actions);
    }

    /// Run one cycle step under the lock, executing any actions it returns.
    pub(crate) fn step(
        self: &Arc<Self>,
        f: impl FnOnce(&mut IntersectionController) -> CycleStep,
    ) -> CycleStep {
        let mut controller = self.controller.lock();
        controller.set_time(wall_clock());
        let mut step = f(&mut controller);
        if let CycleStep::Hold { actions, .. } = &mut step {
            self.execute(std::mem::take(actions));
        }
        step
    }

    pub(crate) fn finish_cycle(self: &Arc<Self>) {
        let mut controller = self.controller.lock();
        controller.set_time(wall_clock());
        let actions = controller.finish_cycle();
        self.execute(actions);
    }

    /// Execute actions in order. Must be called with the controller lock
    /// held. Failures are logged and never reach the controller.
    fn execute(self: &Arc<Self>, actions: Vec<Action>) {
        for action in actions {
            trace!(action = action.type_name(), "Executing action");
            match action {
                Action::Publish(message) => self.publish(&message),
                Action::AppendAudit(record) => self.append_audit(&record),
                Action::StartCycle => {
                    tokio::spawn(run_cycle(Arc::clone(self)));
                }
            }
        }
    }

    fn publish(&self, message: &OutboundMessage) {
        let channel = message.channel();
        let payload = match encode_message(message) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(channel = %channel, error = %e, "Failed to encode outbound message");
                return;
            }
        };
        let topic = self.topics.topic(channel);
        if let Err(e) = self.transport.publish(BusMessage::new(topic, payload)) {
            warn!(topic, error = %e, "Publish failed");
        }
    }

    fn append_audit(&self, record: &AuditRecord) {
        if let Err(e) = self.audit.append(record) {
            warn!(action = record.action.label(), error = %e, "Audit append failed");
        }
    }
}

/// Owns the controller and connects it to the bus.
#[derive(Clone)]
pub struct ControllerRunner {
    shared: Arc<Shared>,
}

impl ControllerRunner {
    pub fn new(
        config: ControllerConfig,
        topics: TopicMap,
        transport: Arc<dyn Transport>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                controller: Mutex::new(IntersectionController::new(config)),
                transport,
                audit,
                topics,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Token that stops the run loop and any in-flight cycle when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shared.shutdown.clone()
    }

    pub fn topics(&self) -> &TopicMap {
        &self.shared.topics
    }

    /// Current dashboard snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.controller.lock().snapshot()
    }

    /// Current governor output.
    pub fn governor_output(&self) -> u8 {
        self.shared.controller.lock().governor_output()
    }

    /// Decode and apply one inbound bus message.
    ///
    /// Unknown topics and malformed payloads are dropped without touching
    /// controller state. Must be called from within a tokio runtime.
    pub fn dispatch(&self, message: &BusMessage) {
        let Some(channel) = self.shared.topics.inbound_channel(&message.topic) else {
            trace!(topic = %message.topic, "Ignoring unsubscribed topic");
            return;
        };

        let event = match decode_event(channel, &message.payload) {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!(channel = %channel, "Ignoring message without event");
                return;
            }
            Err(e) => {
                debug!(channel = %channel, error = %e, "Dropping malformed message");
                return;
            }
        };

        trace!(event = event.type_name(), "Dispatching event");
        self.shared.handle(event);
    }

    /// Publish the startup snapshot, then dispatch inbound messages until
    /// the queue closes or shutdown is requested.
    pub async fn run(self, mut inbound: mpsc::Receiver<BusMessage>) {
        info!(
            subscriptions = ?self.shared.topics.subscriptions(),
            "Controller running"
        );
        {
            let controller = self.shared.controller.lock();
            self.shared
                .publish(&OutboundMessage::Snapshot(controller.snapshot()));
        }

        loop {
            tokio::select! {
                biased;
                _ = self.shared.shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
                message = inbound.recv() => match message {
                    Some(message) => self.dispatch(&message),
                    None => {
                        info!("Inbound queue closed");
                        break;
                    }
                },
            }
        }

        self.shared.shutdown.cancel();
    }
}

impl std::fmt::Debug for ControllerRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRunner")
            .field("controller", &*self.shared.controller.lock())
            .field("topics", &self.shared.topics)
            .finish()
    }
}

/// Wall-clock time since the Unix epoch.
fn wall_clock() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}
