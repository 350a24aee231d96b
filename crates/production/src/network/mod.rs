//! Bus networking.
//!
//! The controller talks to an MQTT-style topic bus through the [`Transport`]
//! trait. Payload encoding lives in [`codec`].

mod codec;
mod stdio;
mod transport;

pub use codec::{decode_event, encode_message, CodecError};
pub use stdio::{forward_lines, parse_line, LineTransport};
pub use transport::{BusMessage, LocalBus, RecordingTransport, Transport, TransportError};
