//! Append-only audit trail.
//!
//! Every significant decision becomes one CSV row:
//!
//! ```text
//! Timestamp,Action,Payload
//! 2023-11-14T22:13:20Z,SYS_1_NORTH_GREEN,"{""duration"":13,""queue"":4}"
//! ```
//!
//! Rows are formatted in the caller's order and handed to a blocking writer
//! task that writes and flushes them one at a time. A failed append never
//! affects the decision that produced the record.

use itms_types::AuditRecord;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Header line of the audit file.
pub const AUDIT_HEADER: &str = "Timestamp,Action,Payload";

/// Errors that can occur while appending to the audit trail.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Audit payload encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Audit writer has stopped")]
    Closed,
}

/// Destination for audit records.
///
/// `append` is called with the controller lock held and must not block.
pub trait AuditSink: Send + Sync + 'static {
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Format one record as a CSV row, without the trailing newline.
pub fn format_row(record: &AuditRecord) -> Result<String, AuditError> {
    let timestamp = humantime::format_rfc3339_seconds(UNIX_EPOCH + record.timestamp);
    let payload = serde_json::to_string(&record.payload)?;
    Ok(format!(
        "{},{},{}",
        timestamp,
        escape_field(record.action.label()),
        escape_field(&payload)
    ))
}

fn escape_field(field: &str) -> String {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CSV file
// ═══════════════════════════════════════════════════════════════════════════

/// Audit trail backed by a CSV file.
#[derive(Debug)]
pub struct CsvAuditLog {
    path: PathBuf,
    rows: mpsc::UnboundedSender<String>,
}

impl CsvAuditLog {
    /// Open `path` for appending, creating it with a header if it does not
    /// exist or is empty, and start the writer task.
    ///
    /// The writer finishes once the log is dropped and every queued row has
    /// been written. Must be called from within a tokio runtime.
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, JoinHandle<()>), AuditError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source: std::io::Error| AuditError::Io {
            path: path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;

        if file.metadata().map_err(io_err)?.len() == 0 {
            writeln!(file, "{AUDIT_HEADER}").map_err(io_err)?;
            file.flush().map_err(io_err)?;
        }

        let (rows, rx) = mpsc::unbounded_channel();
        let writer_path = path.clone();
        let writer = tokio::task::spawn_blocking(move || write_rows(&writer_path, file, rx));
        Ok((Self { path, rows }, writer))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for CsvAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let row = format_row(record)?;
        self.rows.send(row).map_err(|_| AuditError::Closed)
    }
}

fn write_rows(path: &Path, mut file: File, mut rows: mpsc::UnboundedReceiver<String>) {
    while let Some(row) = rows.blocking_recv() {
        if let Err(e) = writeln!(file, "{row}").and_then(|()| file.flush()) {
            warn!(path = %path.display(), error = %e, "Audit write failed");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// In-memory
// ═══════════════════════════════════════════════════════════════════════════

/// Audit trail kept in memory. Used in tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}
