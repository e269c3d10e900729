use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{info, warn};

use super::prober::Prober;
use crate::database::TargetStore;

/// Drives the repeating check cycle: read targets, probe, sleep, repeat.
pub struct Scheduler {
    store: Arc<dyn TargetStore>,
    prober: Prober,
    interval: Duration,
}

impl Scheduler {
    pub fn new(store: Arc<dyn TargetStore>, prober: Prober, interval: Duration) -> Self {
        Self { store, prober, interval }
    }

    /// Run cycles until told to stop.
    ///
    /// The first cycle starts immediately. The interval is measured from the
    /// end of one cycle to the start of the next, so a slow cycle pushes the
    /// following one back by its own overrun and cycles never overlap. A
    /// shutdown signal interrupts the sleep; a cycle already in flight is
    /// left to drain, bounded by the probe timeout.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!(interval_seconds = self.interval.as_secs(), "check scheduler starting");

        loop {
            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.recv() => {
                    info!("check scheduler received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// One pass over the current target list. A store failure skips the pass
    /// without touching the cache; the next interval retries.
    async fn run_cycle(&self) {
        let targets = match self.store.list_targets().await {
            Ok(targets) => targets,
            Err(error) => {
                warn!("skipping check cycle, target list unavailable: {error:#}");
                return;
            }
        };

        let probed = self.prober.run_cycle(&targets).await;
        info!(probed, "status check complete");
    }
}
