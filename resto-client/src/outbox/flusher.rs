//! Submission Flusher - drains the review queue against the gateway
//!
//! One pass: snapshot the pending list, submit each entry in order, remove it
//! only after the gateway acknowledged it. A failed entry stays queued and the
//! pass moves on; it is retried on the next trigger, never within the pass.
//!
//! Passes are serialized by `pass_lock`. A pass started while another runs
//! waits for it and then takes a fresh snapshot, so an entry is never
//! submitted by two overlapping passes.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::gateway::ReviewGateway;
use crate::queue::{QueueResult, ReviewQueue};

/// Outcome of one flush pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub attempted: usize,
    pub delivered: usize,
    /// Transient failures, still queued
    pub failed: usize,
    /// Permanent rejections, moved to the dead letter table
    pub dead_lettered: usize,
    /// Delivered but still queued because removal failed; posted again next pass
    pub unremoved: usize,
}

pub struct Flusher {
    queue: ReviewQueue,
    gateway: Arc<dyn ReviewGateway>,
    pass_lock: Mutex<()>,
}

impl Flusher {
    pub fn new(queue: ReviewQueue, gateway: Arc<dyn ReviewGateway>) -> Self {
        Self {
            queue,
            gateway,
            pass_lock: Mutex::new(()),
        }
    }

    /// Run a pass, waiting for any pass already in progress
    pub async fn flush(&self) -> QueueResult<FlushReport> {
        let _guard = self.pass_lock.lock().await;
        self.run_pass().await
    }

    /// Run a pass unless one is already in progress (returns `None` then)
    pub async fn try_flush(&self) -> Option<QueueResult<FlushReport>> {
        let _guard = self.pass_lock.try_lock().ok()?;
        Some(self.run_pass().await)
    }

    async fn run_pass(&self) -> QueueResult<FlushReport> {
        let pending = self.queue.list_pending()?;
        let mut report = FlushReport::default();

        if pending.is_empty() {
            return Ok(report);
        }

        tracing::info!(count = pending.len(), "Flushing pending reviews");

        for entry in pending {
            report.attempted += 1;

            match self.gateway.create_review(&entry.review).await {
                Ok(confirmed) => {
                    report.delivered += 1;
                    tracing::info!(
                        review_id = entry.id,
                        remote_id = ?confirmed.as_ref().map(|r| r.id),
                        restaurant_id = entry.review.restaurant_id,
                        "Review delivered"
                    );
                    if let Err(e) = self.queue.remove(entry.id) {
                        report.unremoved += 1;
                        tracing::error!(
                            review_id = entry.id,
                            error = %e,
                            "Failed to remove delivered review, it will be posted again on the next pass"
                        );
                    }
                }
                Err(e) if e.is_permanent() => {
                    tracing::error!(review_id = entry.id, error = %e, "Review rejected, moving to dead letter queue");
                    match self.queue.move_to_dead_letter(entry.id, &e.to_string()) {
                        Ok(_) => report.dead_lettered += 1,
                        Err(e2) => {
                            report.failed += 1;
                            tracing::error!(review_id = entry.id, error = %e2, "Failed to dead-letter review");
                        }
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(review_id = entry.id, error = %e, "Review delivery failed, keeping it queued");
                }
            }
        }

        tracing::info!(
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed,
            dead_lettered = report.dead_lettered,
            unremoved = report.unremoved,
            "Flush pass complete"
        );
        Ok(report)
    }
}
