//! Production runner for the ITMS intersection controller.
//!
//! Wraps the synchronous [`IntersectionController`](itms_controller::IntersectionController)
//! with async I/O:
//!
//! - [`network`]: bus transports and the JSON payload codec
//! - [`audit`]: append-only CSV audit trail
//! - [`runner`]: dispatch loop and the secondary-cycle task
//! - [`config`]: TOML process configuration
//! - [`telemetry`]: tracing subscriber setup

pub mod audit;
pub mod config;
mod cycle;
pub mod network;
pub mod runner;
pub mod telemetry;

pub use audit::{AuditError, AuditSink, CsvAuditLog, MemoryAuditLog};
pub use config::{AppConfig, AuditConfig, ConfigError, LoggingConfig};
pub use network::{BusMessage, LineTransport, LocalBus, RecordingTransport, Transport};
pub use runner::ControllerRunner;
pub use telemetry::init_tracing;
