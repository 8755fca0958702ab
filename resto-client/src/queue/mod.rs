//! Local durable queue of review submissions

mod storage;

pub use storage::{DeadLetterEntry, QueueError, QueueResult, QueueStats, ReviewQueue};

#[cfg(test)]
pub(crate) use storage::tests::FailingBackend;
