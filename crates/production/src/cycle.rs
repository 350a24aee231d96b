//! Secondary-arm cycle task.
//!
//! Spawned once per accepted hardware cycle completion. Walks East, South and
//! West, re-entering the controller at every phase boundary; the controller
//! decides whether to hold, skip or abort. Waits are virtual under a paused
//! tokio clock, so the whole cycle is testable without real time passing.

use crate::runner::Shared;
use itms_controller::CycleStep;
use itms_types::Arm;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub(crate) async fn run_cycle(shared: Arc<Shared>) {
    info!("Secondary cycle started");

    for arm in Arm::SECONDARY {
        match shared.step(|controller| controller.begin_secondary_green(arm)) {
            CycleStep::Hold { decision, .. } => {
                info!(arm = %arm, duration_secs = decision.duration_secs, "Secondary green");
                if !hold(&shared, decision.duration()).await {
                    return;
                }
            }
            CycleStep::Skip => {
                debug!(arm = %arm, "Skipping empty arm");
                continue;
            }
            CycleStep::Abort => {
                info!(arm = %arm, "Cycle aborted at green boundary");
                break;
            }
        }

        match shared.step(|controller| controller.begin_secondary_clearance(arm)) {
            CycleStep::Hold { decision, .. } => {
                if !hold(&shared, decision.duration()).await {
                    return;
                }
            }
            CycleStep::Skip | CycleStep::Abort => {
                info!(arm = %arm, "Cycle aborted at clearance boundary");
                break;
            }
        }
    }

    shared.finish_cycle();
    info!("Secondary cycle finished");
}

/// Sleep for `duration`. Returns `false` if shutdown interrupted the wait.
async fn hold(shared: &Shared, duration: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = shared.shutdown.cancelled() => {
            debug!("Cycle cancelled by shutdown");
            false
        }
    }
}
