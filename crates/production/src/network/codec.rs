//! Message encoding and decoding for bus transport.
//!
//! # Wire Format
//!
//! Every payload is a UTF-8 JSON document. Outbound messages are encoded
//! compactly with `serde_json`.
//!
//! # Channel-Based Type Dispatch
//!
//! The payload schema is determined by the channel the topic resolves to,
//! not by a field in the message. Arrival and departure payloads carry no
//! information beyond being valid JSON.

use bytes::Bytes;
use itms_core::{Channel, Event, OutboundMessage};
use itms_types::{
    CorridorTelemetry, HardwareStatus, ProximityReport, QueueReport, SettingsUpdate,
};
use serde::de::{DeserializeOwned, IgnoredAny};
use thiserror::Error;

/// Errors that can occur during message encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Empty payload on {0}")]
    Empty(Channel),

    #[error("JSON decode error on {channel}: {source}")]
    Decode {
        channel: Channel,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{0} is not an inbound channel")]
    NotInbound(Channel),
}

/// Encode an outbound message to wire format.
pub fn encode_message(message: &OutboundMessage) -> Result<Bytes, CodecError> {
    let json = match message {
        OutboundMessage::Signal(command) => serde_json::to_vec(command)?,
        OutboundMessage::Snapshot(snapshot) => serde_json::to_vec(snapshot)?,
        OutboundMessage::Governor(command) => serde_json::to_vec(command)?,
        OutboundMessage::Advisory(advisory) => serde_json::to_vec(advisory)?,
    };
    Ok(Bytes::from(json))
}

/// Decode an inbound payload based on its channel.
///
/// Returns `Ok(None)` for well-formed messages that carry no event, such as
/// hardware status values other than cycle completion.
pub fn decode_event(channel: Channel, data: &[u8]) -> Result<Option<Event>, CodecError> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(CodecError::Empty(channel));
    }

    let event = match channel {
        Channel::Arrival => {
            parse::<IgnoredAny>(channel, data)?;
            Event::VehicleArrived
        }
        Channel::Departure => {
            parse::<IgnoredAny>(channel, data)?;
            Event::VehicleDeparted
        }
        Channel::HardwareStatus => {
            let status: HardwareStatus = parse(channel, data)?;
            if !status.is_cycle_complete() {
                return Ok(None);
            }
            Event::HardwareCycleComplete
        }
        Channel::Settings => Event::SettingsChanged(parse::<SettingsUpdate>(channel, data)?),
        Channel::EmergencyProximity => {
            let report: ProximityReport = parse(channel, data)?;
            Event::EmergencyProximity {
                distance_meters: report.distance,
            }
        }
        Channel::QueueReport => Event::QueueReported(parse::<QueueReport>(channel, data)?),
        Channel::CorridorTelemetry => {
            Event::CorridorTelemetry(parse::<CorridorTelemetry>(channel, data)?)
        }
        Channel::SignalCommand
        | Channel::GovernorCommand
        | Channel::StateSnapshot
        | Channel::CorridorAdvisory => return Err(CodecError::NotInbound(channel)),
    };

    Ok(Some(event))
}

fn parse<T: DeserializeOwned>(channel: Channel, data: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(data).map_err(|source| CodecError::Decode { channel, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use itms_types::{
        AdvisoryAction, AdvisoryReason, Arm, CorridorAdvisory, GovernorCommand, SignalColor,
        SignalCommand,
    };

    #[test]
    fn test_arrival_accepts_any_json() {
        assert_eq!(
            decode_event(Channel::Arrival, b"{}").unwrap(),
            Some(Event::VehicleArrived)
        );
        assert_eq!(
            decode_event(Channel::Departure, br#"{"id": 7}"#).unwrap(),
            Some(Event::VehicleDeparted)
        );
        assert!(decode_event(Channel::Arrival, b"{not json").is_err());
        assert!(matches!(
            decode_event(Channel::Arrival, b"  "),
            Err(CodecError::Empty(Channel::Arrival))
        ));
    }

    #[test]
    fn test_hardware_status_only_cycle_complete() {
        assert_eq!(
            decode_event(Channel::HardwareStatus, br#"{"state":"cycle_complete"}"#).unwrap(),
            Some(Event::HardwareCycleComplete)
        );
        assert_eq!(
            decode_event(Channel::HardwareStatus, br#"{"state":"booting"}"#).unwrap(),
            None
        );
    }

    #[test]
    fn test_proximity_distance() {
        assert_eq!(
            decode_event(Channel::EmergencyProximity, br#"{"distance": 150}"#).unwrap(),
            Some(Event::EmergencyProximity {
                distance_meters: 150.0
            })
        );
        // Missing distance means far away.
        assert_eq!(
            decode_event(Channel::EmergencyProximity, b"{}").unwrap(),
            Some(Event::EmergencyProximity {
                distance_meters: 1000.0
            })
        );
        assert!(decode_event(Channel::EmergencyProximity, br#"{"distance":"near"}"#).is_err());
    }

    #[test]
    fn test_settings_and_queue_report() {
        assert_eq!(
            decode_event(Channel::Settings, br#"{"manual_limit": 300}"#).unwrap(),
            Some(Event::SettingsChanged(SettingsUpdate {
                manual_limit: Some(300),
                ..Default::default()
            }))
        );
        assert_eq!(
            decode_event(Channel::QueueReport, br#"{"arm":"South","count":3}"#).unwrap(),
            Some(Event::QueueReported(QueueReport {
                arm: Arm::South,
                count: 3
            }))
        );
        assert!(decode_event(Channel::QueueReport, br#"{"arm":"Up","count":3}"#).is_err());
    }

    #[test]
    fn test_outbound_channel_rejected() {
        assert!(matches!(
            decode_event(Channel::SignalCommand, b"{}"),
            Err(CodecError::NotInbound(Channel::SignalCommand))
        ));
    }

    #[test]
    fn test_encode_shapes() {
        let signal = encode_message(&OutboundMessage::Signal(SignalCommand {
            color: SignalColor::Green,
            duration: 13,
        }))
        .unwrap();
        assert_eq!(&signal[..], br#"{"color":"GREEN","duration":13}"#);

        let governor =
            encode_message(&OutboundMessage::Governor(GovernorCommand { pwm: 180 })).unwrap();
        assert_eq!(&governor[..], br#"{"pwm":180}"#);

        let advisory = encode_message(&OutboundMessage::Advisory(CorridorAdvisory {
            action: AdvisoryAction::Normal,
            signal: None,
            speed_limit: 60,
            reason: AdvisoryReason::Normal,
        }))
        .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&advisory).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"action":"normal","speed_limit":60,"reason":"normal"})
        );
    }
}
