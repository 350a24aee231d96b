//! End-to-end scenarios through the runner with a paused tokio clock.

use itms_controller::ControllerConfig;
use itms_core::TopicMap;
use itms_production::audit::{AuditError, AuditSink, MemoryAuditLog};
use itms_production::{BusMessage, ControllerRunner, LineTransport, LocalBus, RecordingTransport};
use itms_test_helpers::queues;
use itms_types::{Arm, AuditAction, AuditRecord, QueueState, SignalColor};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

const SIGNAL: &str = "city/signal";
const DASHBOARD: &str = "city/dashboard/state";

struct Harness {
    runner: ControllerRunner,
    transport: Arc<RecordingTransport>,
    audit: Arc<MemoryAuditLog>,
}

impl Harness {
    fn new(initial: QueueState) -> Self {
        let transport = Arc::new(RecordingTransport::new());
        let audit = Arc::new(MemoryAuditLog::new());
        let runner = ControllerRunner::new(
            ControllerConfig::with_initial_queues(initial),
            TopicMap::default(),
            transport.clone(),
            audit.clone(),
        );
        Self {
            runner,
            transport,
            audit,
        }
    }

    fn send(&self, topic: &str, payload: &str) {
        self.runner
            .dispatch(&BusMessage::new(topic.to_owned(), payload.to_owned()));
    }

    fn cycle_complete(&self) {
        self.send("city/status", r#"{"state":"cycle_complete"}"#);
    }

    /// `(active_arm, color)` of every published snapshot, in order.
    fn heads(&self) -> Vec<(String, String)> {
        self.transport
            .json_on(DASHBOARD)
            .into_iter()
            .map(|snapshot| {
                (
                    snapshot["active_arm"].as_str().unwrap_or_default().to_owned(),
                    snapshot["color"].as_str().unwrap_or_default().to_owned(),
                )
            })
            .collect()
    }

    fn head_now(&self) -> (Arm, SignalColor) {
        let snapshot = self.runner.snapshot();
        (snapshot.active_arm, snapshot.color)
    }
}

fn head(arm: &str, color: &str) -> (String, String) {
    (arm.to_owned(), color.to_owned())
}

#[tokio::test(start_paused = true)]
async fn test_arrival_grants_north_thirteen_seconds() {
    let h = Harness::new(queues(3, 0, 0, 0));

    h.send("road/in", "{}");

    assert_eq!(
        h.transport.json_on(SIGNAL),
        vec![json!({"color": "GREEN", "duration": 13})]
    );
    assert_eq!(h.heads().last(), Some(&head("North", "GREEN")));
    assert_eq!(h.transport.json_on("city/governor"), vec![json!({"pwm": 180})]);

    let records = h.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, AuditAction::NorthGreen);
    assert_eq!(records[0].payload, json!({"duration": 13, "queue": 4}));
}

#[tokio::test(start_paused = true)]
async fn test_secondary_cycle_skips_empty_arm() {
    let h = Harness::new(queues(0, 0, 3, 2));

    h.cycle_complete();

    sleep(Duration::from_secs(5)).await;
    assert_eq!(h.head_now(), (Arm::South, SignalColor::Green));

    // South green is 10 s, then 2 s clearance.
    sleep(Duration::from_secs(6)).await;
    assert_eq!(h.head_now(), (Arm::South, SignalColor::Yellow));

    // West green is 8 s, from 12 s to 20 s.
    sleep(Duration::from_secs(5)).await;
    assert_eq!(h.head_now(), (Arm::West, SignalColor::Green));

    sleep(Duration::from_secs(5)).await;
    assert_eq!(h.head_now(), (Arm::West, SignalColor::Yellow));

    sleep(Duration::from_secs(2)).await;
    assert_eq!(h.head_now(), (Arm::North, SignalColor::Red));

    assert_eq!(
        h.heads(),
        vec![
            head("North", "RED"),
            head("South", "GREEN"),
            head("South", "YELLOW"),
            head("West", "GREEN"),
            head("West", "YELLOW"),
            head("North", "RED"),
        ]
    );
    // Secondary phases are dashboard-only.
    assert!(h.transport.json_on(SIGNAL).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cycle_returns_to_waiting_north() {
    let h = Harness::new(queues(0, 1, 0, 0));

    h.cycle_complete();
    sleep(Duration::from_secs(1)).await;
    h.send("road/in", "{}");
    h.send("road/in", "{}");
    // North is red during the cycle; arrivals do not grant it.
    assert!(h.transport.json_on(SIGNAL).is_empty());

    // East: 5 s green + 2 s clearance.
    sleep(Duration::from_secs(7)).await;

    assert_eq!(h.head_now(), (Arm::North, SignalColor::Green));
    assert_eq!(
        h.transport.json_on(SIGNAL),
        vec![json!({"color": "GREEN", "duration": 8})]
    );
}

#[tokio::test(start_paused = true)]
async fn test_emergency_aborts_cycle_at_next_boundary() {
    let h = Harness::new(queues(0, 0, 3, 2));

    h.cycle_complete();
    sleep(Duration::from_secs(5)).await;
    assert_eq!(h.head_now(), (Arm::South, SignalColor::Green));

    h.send("v2i/ambulance/gps", r#"{"distance": 150}"#);

    assert_eq!(h.head_now(), (Arm::North, SignalColor::Green));
    assert!(h.runner.snapshot().emergency);
    assert_eq!(
        h.transport.json_on(SIGNAL),
        vec![json!({"color": "GREEN", "duration": 30})]
    );

    sleep(Duration::from_secs(60)).await;

    // The South clearance and the West phase never happen.
    let heads = h.heads();
    let emergency_at = heads
        .iter()
        .position(|(arm, color)| arm == "North" && color == "GREEN")
        .unwrap();
    assert!(heads[emergency_at..]
        .iter()
        .all(|(arm, color)| arm == "North" && color == "GREEN"));
    assert_eq!(h.head_now(), (Arm::North, SignalColor::Green));

    let records = h.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, AuditAction::Emergency);
    assert_eq!(records[0].payload["distance"], json!(150.0));
}

#[tokio::test(start_paused = true)]
async fn test_repeated_near_reports_do_not_republish() {
    let h = Harness::new(queues(0, 0, 0, 0));

    h.send("v2i/ambulance/gps", r#"{"distance": 150}"#);
    h.send("v2i/ambulance/gps", r#"{"distance": 90}"#);
    h.send("v2i/ambulance/gps", r#"{"distance": 500}"#);

    assert_eq!(h.transport.json_on(SIGNAL).len(), 1);
    assert_eq!(h.audit.records().len(), 1);
    assert!(!h.runner.snapshot().emergency);
    // Clearing does not resume scheduling; North stays green.
    assert_eq!(h.head_now(), (Arm::North, SignalColor::Green));
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_cycle_complete_starts_one_cycle() {
    let h = Harness::new(queues(0, 0, 3, 0));

    h.cycle_complete();
    h.cycle_complete();
    sleep(Duration::from_secs(1)).await;
    h.cycle_complete();
    sleep(Duration::from_secs(30)).await;

    assert_eq!(
        h.heads(),
        vec![
            head("North", "RED"),
            head("South", "GREEN"),
            head("South", "YELLOW"),
            head("North", "RED"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_malformed_payloads_change_nothing() {
    let h = Harness::new(queues(1, 1, 1, 1));
    let before = h.runner.snapshot();

    for topic in TopicMap::default().subscriptions() {
        h.send(topic, "{definitely not json");
        h.send(topic, "");
    }
    h.send("city/queues", r#"{"arm":"Sideways","count":3}"#);
    h.send("city/settings", r#"{"danger":"yes"}"#);

    sleep(Duration::from_secs(60)).await;

    assert_eq!(h.runner.snapshot(), before);
    assert!(h.transport.published().is_empty());
    assert!(h.audit.records().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_settings_and_advisory_are_audited() {
    let h = Harness::new(queues(4, 0, 0, 0));

    h.send("city/settings", r#"{"danger": true}"#);
    h.send("city/settings", r#"{"manual_limit": 50}"#);
    h.send(
        "sensor/road1/data",
        r#"{"vehicle_count": 30, "avg_speed": 22.5, "emergency_detected": false}"#,
    );

    assert_eq!(
        h.transport.json_on("city/governor"),
        vec![json!({"pwm": 90}), json!({"pwm": 50})]
    );
    assert_eq!(
        h.transport.json_on("control/road1/cmd"),
        vec![json!({"action": "reduce_speed", "speed_limit": 40, "reason": "heavy_congestion"})]
    );
    let labels: Vec<&str> = h
        .audit
        .records()
        .iter()
        .map(|record| record.action.label())
        .collect();
    assert_eq!(labels, vec!["SYS_3_SETTINGS", "SYS_3_SETTINGS", "reduce_speed"]);
}

struct FailingAudit;

impl AuditSink for FailingAudit {
    fn append(&self, _record: &AuditRecord) -> Result<(), AuditError> {
        Err(AuditError::Io {
            path: "/full/disk.csv".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        })
    }
}

#[tokio::test(start_paused = true)]
async fn test_audit_failure_does_not_block_decision() {
    let transport = Arc::new(RecordingTransport::new());
    let runner = ControllerRunner::new(
        ControllerConfig::with_initial_queues(queues(3, 0, 0, 0)),
        TopicMap::default(),
        transport.clone(),
        Arc::new(FailingAudit),
    );

    runner.dispatch(&BusMessage::new("road/in", "{}"));

    assert_eq!(
        transport.json_on(SIGNAL),
        vec![json!({"color": "GREEN", "duration": 13})]
    );
    assert_eq!(runner.snapshot().color, SignalColor::Green);
}

#[tokio::test(start_paused = true)]
async fn test_publish_failure_does_not_block_decision() {
    // No subscribers, so every publish fails.
    let bus = Arc::new(LocalBus::new(16));
    let audit = Arc::new(MemoryAuditLog::new());
    let runner = ControllerRunner::new(
        ControllerConfig::with_initial_queues(queues(0, 0, 0, 0)),
        TopicMap::default(),
        bus,
        audit.clone(),
    );

    runner.dispatch(&BusMessage::new("road/in", "{}"));

    assert_eq!(runner.snapshot().queues.north(), 1);
    assert_eq!(runner.snapshot().color, SignalColor::Green);
    assert_eq!(audit.records().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_consumer_does_not_block_decisions() {
    // The read half is kept open but never read, so the writer task blocks
    // once the duplex buffer fills.
    let (write_half, _read_half) = tokio::io::duplex(64);
    let (transport, _writer) = LineTransport::spawn(write_half);
    let audit = Arc::new(MemoryAuditLog::new());
    let runner = ControllerRunner::new(
        ControllerConfig::with_initial_queues(queues(0, 0, 3, 0)),
        TopicMap::default(),
        Arc::new(transport),
        audit.clone(),
    );

    for _ in 0..20 {
        runner.dispatch(&BusMessage::new("road/in", "{}"));
        runner.dispatch(&BusMessage::new("road/out", "{}"));
    }
    runner.dispatch(&BusMessage::new("city/status", r#"{"state":"cycle_complete"}"#));
    assert_eq!(runner.snapshot().queues.north(), 0);

    sleep(Duration::from_secs(30)).await;

    let snapshot = runner.snapshot();
    assert_eq!(snapshot.active_arm, Arm::North);
    assert_eq!(snapshot.color, SignalColor::Red);
    // Only the first arrival found North red.
    assert_eq!(audit.records().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_over_local_bus() {
    let bus = Arc::new(LocalBus::new(64));
    let mut outbound = bus.subscribe();
    let runner = ControllerRunner::new(
        ControllerConfig::with_initial_queues(queues(0, 0, 0, 0)),
        TopicMap::default(),
        bus.clone(),
        Arc::new(MemoryAuditLog::new()),
    );

    let (tx, rx) = mpsc::channel(8);
    let task = tokio::spawn(runner.clone().run(rx));

    tx.send(BusMessage::new("road/in", "{}")).await.unwrap();
    drop(tx);
    task.await.unwrap();

    let first = outbound.recv().await.unwrap();
    assert_eq!(first.topic, DASHBOARD);
    let mut topics = vec![];
    while let Ok(message) = outbound.try_recv() {
        topics.push(message.topic);
    }
    assert!(topics.contains(&SIGNAL.to_owned()));
    assert_eq!(runner.snapshot().queues.north(), 1);
    assert!(runner.shutdown_token().is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_cycle() {
    let h = Harness::new(queues(0, 0, 3, 2));

    h.cycle_complete();
    sleep(Duration::from_secs(2)).await;
    h.runner.shutdown_token().cancel();
    sleep(Duration::from_secs(60)).await;

    assert_eq!(h.head_now(), (Arm::South, SignalColor::Green));
    assert_eq!(h.heads().len(), 2);
}
