//! ITMS intersection controller daemon.
//!
//! Reads `<topic> <json>` lines from stdin and writes published messages to
//! stdout in the same format, so it can be bridged to any MQTT broker with
//! its command-line clients:
//!
//! ```text
//! mosquitto_sub -v -t road/in -t road/out -t city/# -t v2i/# -t sensor/# \
//!   | itmsd --config itms.toml \
//!   | while read -r topic payload; do mosquitto_pub -t "$topic" -m "$payload"; done
//! ```

use anyhow::Context;
use clap::Parser;
use itms_production::network::forward_lines;
use itms_production::{init_tracing, AppConfig, ControllerRunner, CsvAuditLog, LineTransport};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// How long to wait for queued output and audit rows at shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "itmsd")]
#[command(about = "Decision engine for a four-arm signalized intersection")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Audit CSV file (overrides the config file)
    #[arg(long)]
    audit_path: Option<PathBuf>,

    /// Log filter directive, e.g. "info,itms_controller=debug"
    #[arg(long)]
    log_filter: Option<String>,

    /// Inbound message queue capacity
    #[arg(long, default_value = "1024")]
    inbound_capacity: NonZeroUsize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(path) = cli.audit_path {
        config = config.with_audit_path(path);
    }
    if let Some(filter) = cli.log_filter {
        config = config.with_log_filter(filter);
    }

    let _log_guard = init_tracing(&config.logging);

    let (audit, audit_writer) = CsvAuditLog::open(&config.audit.path)
        .with_context(|| format!("opening audit log {}", config.audit.path.display()))?;
    info!(path = %audit.path().display(), "Audit log open");

    let (transport, stdout_writer) = LineTransport::stdout();
    let runner = ControllerRunner::new(
        config.controller,
        config.topics,
        Arc::new(transport),
        Arc::new(audit),
    );

    let shutdown = runner.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received");
            shutdown.cancel();
        }
    });

    let (tx, rx) = mpsc::channel(cli.inbound_capacity.get());
    let reader = tokio::spawn(async move {
        if let Err(e) = forward_lines(BufReader::new(tokio::io::stdin()), tx).await {
            error!(error = %e, "Failed to read stdin");
        }
    });

    runner.run(rx).await;
    reader.abort();

    // Writers finish once the runner and its cycle task release their handles.
    match tokio::time::timeout(DRAIN_TIMEOUT, stdout_writer).await {
        Ok(Ok(Err(e))) => error!(error = %e, "Failed to write stdout"),
        Ok(Err(e)) => error!(error = %e, "Stdout writer panicked"),
        Err(_) => warn!("Timed out draining stdout"),
        Ok(Ok(Ok(()))) => {}
    }
    if tokio::time::timeout(DRAIN_TIMEOUT, audit_writer).await.is_err() {
        warn!("Timed out draining audit log");
    }

    info!("Controller stopped");
    Ok(())
}
