//! Offline review outbox
//!
//! ```text
//! submit(form) ──▶ validate ──▶ ReviewQueue::enqueue (durable) ──▶ spawn Flusher::flush
//!                                        │
//!        ConnectivityTrigger ────────────┴──▶ Flusher::flush on startup / reconnect
//! ```
//!
//! The queue write always completes before any delivery attempt, so a review
//! survives even if the flush never finishes.

mod connectivity;
mod flusher;
mod trigger;

pub use connectivity::{Connectivity, ConnectivityProbe, ConnectivityState};
pub use flusher::{FlushReport, Flusher};
pub use trigger::ConnectivityTrigger;

use shared::error::ValidationError;
use shared::models::{NewReview, PendingReview, ReviewForm};
use std::sync::Arc;
use thiserror::Error;

use crate::gateway::ReviewGateway;
use crate::queue::{QueueError, QueueResult, ReviewQueue};

#[derive(Debug, Error)]
pub enum OutboxError {
    #[error("Invalid review: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to store review: {0}")]
    Queue(#[from] QueueError),
}

/// Entry point for review submissions
#[derive(Clone)]
pub struct ReviewOutbox {
    queue: ReviewQueue,
    flusher: Arc<Flusher>,
}

impl ReviewOutbox {
    pub fn new(queue: ReviewQueue, gateway: Arc<dyn ReviewGateway>) -> Self {
        let flusher = Arc::new(Flusher::new(queue.clone(), gateway));
        Self { queue, flusher }
    }

    pub fn queue(&self) -> &ReviewQueue {
        &self.queue
    }

    pub fn flusher(&self) -> Arc<Flusher> {
        self.flusher.clone()
    }

    /// Queue a review and start delivering it in the background.
    ///
    /// Returns as soon as the review is durably stored. Delivery failures
    /// are not reported here; the entry stays queued for the next trigger.
    /// Must be called from within a tokio runtime.
    pub async fn submit(&self, form: ReviewForm) -> Result<PendingReview, OutboxError> {
        let review = NewReview::from_form(form)?;
        let id = self.queue.enqueue(&review)?;
        tracing::info!(review_id = id, restaurant_id = review.restaurant_id, "Review queued");

        let flusher = self.flusher.clone();
        tokio::spawn(async move {
            if let Err(e) = flusher.flush().await {
                tracing::error!(error = %e, "Flush after submit failed");
            }
        });

        Ok(PendingReview { id, review })
    }

    /// Submit raw `name=value` form fields
    pub async fn submit_fields<I, K, V>(&self, fields: I) -> Result<PendingReview, OutboxError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let form = ReviewForm::from_fields(fields)?;
        self.submit(form).await
    }

    /// Reviews of a restaurant that are not confirmed yet
    pub fn pending_for_restaurant(&self, restaurant_id: i64) -> QueueResult<Vec<PendingReview>> {
        self.queue.list_pending_for_restaurant(restaurant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::flusher::tests::{Reply, ScriptedGateway};
    use super::*;
    use crate::queue::FailingBackend;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    async fn wait_for_empty(queue: &ReviewQueue) {
        for _ in 0..200 {
            if queue.list_pending().unwrap().is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("queue not drained in time");
    }

    #[tokio::test]
    async fn test_submit_returns_pending_review_and_flushes() {
        let queue = ReviewQueue::open_in_memory().unwrap();
        let gateway = Arc::new(ScriptedGateway::new(Reply::Accept));
        let outbox = ReviewOutbox::new(queue.clone(), gateway.clone());

        let pending = outbox
            .submit(ReviewForm::new(5, "Alice", 4, "Great"))
            .await
            .unwrap();
        assert_eq!(pending.review.restaurant_id, 5);
        assert_eq!(pending.review.name, "Alice");
        assert!(pending.id > 0);

        wait_for_empty(&queue).await;
        assert_eq!(gateway.calls(), vec!["Alice"]);
    }

    #[tokio::test]
    async fn test_submit_while_gateway_down_keeps_review() {
        let queue = ReviewQueue::open_in_memory().unwrap();
        let gateway = Arc::new(ScriptedGateway::new(Reply::Unavailable));
        let outbox = ReviewOutbox::new(queue.clone(), gateway.clone());

        let pending = outbox
            .submit_fields([
                ("restaurant_id", "5"),
                ("name", "Alice"),
                ("rating", "4"),
                ("comments", "Great"),
            ])
            .await
            .unwrap();

        // Let the background pass run
        for _ in 0..100 {
            if !gateway.calls().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        // Wait for the pass to release its lock
        outbox.flusher().flush().await.unwrap();

        let queued = outbox.pending_for_restaurant(5).unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0], pending);
        assert!(outbox.pending_for_restaurant(6).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_submission_is_not_queued() {
        let queue = ReviewQueue::open_in_memory().unwrap();
        let gateway = Arc::new(ScriptedGateway::new(Reply::Accept));
        let outbox = ReviewOutbox::new(queue.clone(), gateway.clone());

        let err = outbox
            .submit(ReviewForm::new(5, "Alice", 7, "Too good"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OutboxError::Validation(ValidationError::RatingOutOfRange { .. })
        ));

        let err = outbox
            .submit_fields([("restaurant_id", "5"), ("name", "Alice")])
            .await
            .unwrap_err();
        assert!(matches!(err, OutboxError::Validation(_)));

        assert!(queue.list_pending().unwrap().is_empty());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_reaches_submitter() {
        let (backend, fail) = FailingBackend::new();
        let queue = ReviewQueue::open_with_backend(backend).unwrap();
        let gateway = Arc::new(ScriptedGateway::new(Reply::Accept));
        let outbox = ReviewOutbox::new(queue, gateway.clone());

        fail.store(true, Ordering::SeqCst);
        let err = outbox
            .submit(ReviewForm::new(5, "Alice", 4, "Great"))
            .await
            .unwrap_err();
        assert!(matches!(err, OutboxError::Queue(_)));

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(gateway.calls().is_empty());
    }
}
