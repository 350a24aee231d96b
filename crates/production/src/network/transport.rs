//! Bus transport abstraction.
//!
//! The pub/sub transport is an external collaborator. The runner only needs
//! to hand it topic/payload pairs; delivery guarantees belong to the bus.

use bytes::Bytes;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::broadcast;

/// A raw message on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Bytes,
}

impl BusMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Payload as UTF-8 text, lossy.
    pub fn payload_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// Errors that can occur while publishing.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("No subscribers on the bus")]
    NoSubscribers,

    #[error("Transport writer has stopped")]
    Closed,
}

/// Outbound side of the bus.
///
/// `publish` must not block: it is called while the controller lock is held
/// so outbound order matches decision order. Transports backed by real I/O
/// queue the message and write it from their own task.
pub trait Transport: Send + Sync + 'static {
    fn publish(&self, message: BusMessage) -> Result<(), TransportError>;
}

/// In-process bus backed by a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct LocalBus {
    sender: broadcast::Sender<BusMessage>,
}

impl LocalBus {
    /// Create a bus that buffers up to `capacity` messages per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.sender.subscribe()
    }
}

impl Transport for LocalBus {
    fn publish(&self, message: BusMessage) -> Result<(), TransportError> {
        self.sender
            .send(message)
            .map(|_| ())
            .map_err(|_| TransportError::NoSubscribers)
    }
}

/// Transport that keeps every published message, for tests and replay.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    published: Mutex<Vec<BusMessage>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages published so far, in order.
    pub fn published(&self) -> Vec<BusMessage> {
        self.published.lock().clone()
    }

    /// Payloads published on `topic`, decoded as JSON.
    pub fn json_on(&self, topic: &str) -> Vec<serde_json::Value> {
        self.published
            .lock()
            .iter()
            .filter(|message| message.topic == topic)
            .filter_map(|message| serde_json::from_slice(&message.payload).ok())
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn publish(&self, message: BusMessage) -> Result<(), TransportError> {
        self.published.lock().push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_bus_without_subscribers_errors() {
        let bus = LocalBus::new(8);
        assert!(matches!(
            bus.publish(BusMessage::new("city/signal", "{}")),
            Err(TransportError::NoSubscribers)
        ));
    }

    #[tokio::test]
    async fn test_local_bus_delivers_in_order() {
        let bus = LocalBus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(BusMessage::new("a", "1")).unwrap();
        bus.publish(BusMessage::new("b", "2")).unwrap();

        assert_eq!(rx.recv().await.unwrap().topic, "a");
        assert_eq!(rx.recv().await.unwrap().topic, "b");
    }

    #[test]
    fn test_recording_transport_filters_by_topic() {
        let transport = RecordingTransport::new();
        transport
            .publish(BusMessage::new("city/governor", r#"{"pwm":255}"#))
            .unwrap();
        transport
            .publish(BusMessage::new("city/signal", "not json"))
            .unwrap();

        assert_eq!(
            transport.json_on("city/governor"),
            vec![serde_json::json!({"pwm": 255})]
        );
        assert!(transport.json_on("city/signal").is_empty());
        assert_eq!(transport.published().len(), 2);
    }
}
