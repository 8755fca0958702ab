//! Connectivity Trigger - decides when the flusher runs
//!
//! ```text
//! ConnectivityTrigger
//!   ├── Startup: one pass after `startup_delay`
//!   └── Listen: Connectivity watch, one pass per offline -> online transition
//! ```
//!
//! There is no timer-driven pass. If the host never reports a reconnect,
//! queued reviews wait for the next start.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::connectivity::ConnectivityState;
use super::flusher::Flusher;

pub struct ConnectivityTrigger {
    flusher: Arc<Flusher>,
    connectivity: watch::Receiver<ConnectivityState>,
    shutdown: CancellationToken,
    startup_delay: Duration,
}

impl ConnectivityTrigger {
    pub fn new(
        flusher: Arc<Flusher>,
        connectivity: watch::Receiver<ConnectivityState>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            flusher,
            connectivity,
            shutdown,
            startup_delay: Duration::ZERO,
        }
    }

    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    pub async fn run(mut self) {
        tracing::info!("ConnectivityTrigger started");

        tokio::select! {
            _ = self.shutdown.cancelled() => {
                tracing::info!("ConnectivityTrigger stopped before startup flush");
                return;
            }
            _ = tokio::time::sleep(self.startup_delay) => {}
        }

        // Reconnects that happened before the startup pass are covered by it
        let mut seen_reconnects = self.connectivity.borrow_and_update().reconnects;
        self.flush("startup").await;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,

                changed = self.connectivity.changed() => {
                    if changed.is_err() {
                        tracing::info!("Connectivity channel closed, ConnectivityTrigger stopping");
                        break;
                    }
                    let state = *self.connectivity.borrow_and_update();
                    if state.reconnects != seen_reconnects {
                        seen_reconnects = state.reconnects;
                        self.flush("reconnect").await;
                    }
                }
            }
        }

        tracing::info!("ConnectivityTrigger stopped");
    }

    async fn flush(&self, reason: &'static str) {
        tracing::debug!(reason, "Triggering flush");
        if let Err(e) = self.flusher.flush().await {
            tracing::error!(reason, error = %e, "Flush pass failed");
        }
    }
}
