//! Core types for the ITMS intersection controller.
//!
//! This crate defines the seam between the synchronous decision logic and the
//! async runner:
//!
//! - [`Event`]: decoded inbound bus messages
//! - [`Action`]: side effects the runner performs (publish, audit, spawn)
//! - [`StateMachine`]: the trait every controller state machine implements
//! - [`Channel`] / [`TopicMap`]: logical channels and their bus topics

mod action;
mod channel;
mod event;
mod message;
mod traits;

pub use action::Action;
pub use channel::{Channel, TopicMap};
pub use event::Event;
pub use message::OutboundMessage;
pub use traits::StateMachine;
