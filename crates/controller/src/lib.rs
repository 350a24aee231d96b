//! Intersection controller state machine.
//!
//! This crate provides the synchronous decision logic for a single four-arm
//! intersection, usable from the production runner and from tests alike.
//!
//! # Architecture
//!
//! The controller processes events synchronously:
//!
//! - `Event::VehicleArrived` → North queue +1, governor, wake North if idle
//! - `Event::VehicleDeparted` → North queue −1, governor
//! - `Event::HardwareCycleComplete` → North red, set latch, start secondary cycle
//! - `Event::SettingsChanged` → settings, governor, audit
//! - `Event::EmergencyProximity` → preemption override
//! - `Event::QueueReported` → secondary queue counts
//! - `Event::CorridorTelemetry` → corridor speed advisory
//!
//! The secondary cycle is the only part that waits. The runner drives it
//! through [`IntersectionController::begin_secondary_green`],
//! [`IntersectionController::begin_secondary_clearance`] and
//! [`IntersectionController::finish_cycle`].
//!
//! All I/O is performed by the runner via returned `Action`s.

mod advisory;
mod config;
mod cycle;
mod preemption;
mod scheduler;
mod state;

pub use advisory::advise;
pub use config::{ControllerConfig, ConfigValidationError, EMERGENCY_RADIUS_METERS};
pub use cycle::CycleStep;
pub use preemption::EmergencyPreemption;
pub use scheduler::PhaseScheduler;
pub use state::IntersectionController;
