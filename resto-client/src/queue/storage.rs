//! redb-based storage for pending review submissions
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `pending_reviews` | `id` | `NewReview` | Outbox (ordered by id) |
//! | `dead_letter_reviews` | `id` | `DeadLetterEntry` | Permanently rejected reviews |
//! | `sequence_counter` | `&str` | `u64` | Last assigned review id |
//!
//! Ids come from a persistent counter and are never reused, so iterating
//! `pending_reviews` in key order yields insertion order.
//!
//! # Durability
//!
//! Every mutation commits its own write transaction with redb's default
//! immediate durability: once `enqueue` returns, the review survives a crash
//! or restart.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
};
use serde::{Deserialize, Serialize};
use shared::models::{NewReview, PendingReview};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Pending reviews: key = queue id, value = JSON-serialized NewReview
const PENDING_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("pending_reviews");

/// Dead letters: key = queue id, value = JSON-serialized DeadLetterEntry
const DEAD_LETTER_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("dead_letter_reviews");

const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const REVIEW_ID_KEY: &str = "review_id";

/// A review the gateway refused permanently
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadLetterEntry {
    pub id: u64,
    pub review: NewReview,
    pub failed_at: i64,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type QueueResult<T> = Result<T, QueueError>;

/// Durable FIFO of reviews waiting for the gateway
#[derive(Clone)]
pub struct ReviewQueue {
    db: Arc<Database>,
}

impl ReviewQueue {
    /// Open or create the queue file, creating parent directories as needed
    pub fn open(path: impl AsRef<Path>) -> QueueResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Database::create(path)?)
    }

    /// Open an in-memory queue (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> QueueResult<Self> {
        Self::open_with_backend(redb::backends::InMemoryBackend::new())
    }

    #[cfg(test)]
    pub(crate) fn open_with_backend(backend: impl redb::StorageBackend) -> QueueResult<Self> {
        let db = Database::builder().create_with_backend(backend)?;
        Self::init(db)
    }

    fn init(db: Database) -> QueueResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PENDING_TABLE)?;
            let _ = write_txn.open_table(DEAD_LETTER_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(REVIEW_ID_KEY)?.is_none() {
                seq_table.insert(REVIEW_ID_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    // ========== Pending Queue ==========

    /// Persist a review and return its assigned id
    pub fn enqueue(&self, review: &NewReview) -> QueueResult<u64> {
        let txn = self.db.begin_write()?;
        let id = {
            let mut seq_table = txn.open_table(SEQUENCE_TABLE)?;
            let next = seq_table
                .get(REVIEW_ID_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0)
                + 1;
            seq_table.insert(REVIEW_ID_KEY, next)?;

            let mut table = txn.open_table(PENDING_TABLE)?;
            let value = serde_json::to_vec(review)?;
            table.insert(next, value.as_slice())?;
            next
        };
        txn.commit()?;

        tracing::debug!(review_id = id, restaurant_id = review.restaurant_id, "Review enqueued");
        Ok(id)
    }

    /// All pending reviews in insertion order
    pub fn list_pending(&self) -> QueueResult<Vec<PendingReview>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_TABLE)?;

        let mut entries = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            let review: NewReview = serde_json::from_slice(value.value())?;
            entries.push(PendingReview {
                id: key.value(),
                review,
            });
        }
        Ok(entries)
    }

    /// Pending reviews for one restaurant, for "not yet confirmed" rendering
    pub fn list_pending_for_restaurant(&self, restaurant_id: i64) -> QueueResult<Vec<PendingReview>> {
        let mut entries = self.list_pending()?;
        entries.retain(|p| p.review.restaurant_id == restaurant_id);
        Ok(entries)
    }

    /// Get a single pending review
    pub fn get(&self, id: u64) -> QueueResult<Option<PendingReview>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_TABLE)?;

        match table.get(id)? {
            Some(guard) => {
                let review: NewReview = serde_json::from_slice(guard.value())?;
                Ok(Some(PendingReview { id, review }))
            }
            None => Ok(None),
        }
    }

    /// Delete a pending review.
    ///
    /// Returns whether an entry was removed; an unknown id is not an error.
    pub fn remove(&self, id: u64) -> QueueResult<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(PENDING_TABLE)?;
            let removed = table.remove(id)?.is_some();
            removed
        };
        txn.commit()?;
        Ok(removed)
    }

    // ========== Dead Letters ==========

    /// Move a pending review to the dead letter table
    pub fn move_to_dead_letter(&self, id: u64, reason: &str) -> QueueResult<bool> {
        let txn = self.db.begin_write()?;
        let moved = {
            let mut pending_table = txn.open_table(PENDING_TABLE)?;
            let mut dead_letter_table = txn.open_table(DEAD_LETTER_TABLE)?;

            let bytes = pending_table.get(id)?.map(|guard| guard.value().to_vec());
            match bytes {
                Some(bytes) => {
                    let entry = DeadLetterEntry {
                        id,
                        review: serde_json::from_slice(&bytes)?,
                        failed_at: shared::util::now_millis(),
                        reason: reason.to_string(),
                    };
                    let value = serde_json::to_vec(&entry)?;
                    dead_letter_table.insert(id, value.as_slice())?;
                    pending_table.remove(id)?;
                    true
                }
                None => false,
            }
        };
        txn.commit()?;
        Ok(moved)
    }

    pub fn list_dead_letters(&self) -> QueueResult<Vec<DeadLetterEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DEAD_LETTER_TABLE)?;

        let mut entries = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let entry: DeadLetterEntry = serde_json::from_slice(value.value())?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Drop a dead letter for good
    pub fn remove_dead_letter(&self, id: u64) -> QueueResult<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(DEAD_LETTER_TABLE)?;
            let removed = table.remove(id)?.is_some();
            removed
        };
        txn.commit()?;
        Ok(removed)
    }

    /// Move every dead letter back to the pending queue under its original id.
    ///
    /// Used after the gateway-side cause of the rejection has been fixed.
    pub fn requeue_dead_letters(&self) -> QueueResult<usize> {
        let txn = self.db.begin_write()?;
        let count = {
            let mut pending_table = txn.open_table(PENDING_TABLE)?;
            let mut dead_letter_table = txn.open_table(DEAD_LETTER_TABLE)?;

            // Collect first (can't iterate and mutate simultaneously)
            let mut entries = Vec::new();
            for result in dead_letter_table.iter()? {
                let (_key, value) = result?;
                let entry: DeadLetterEntry = serde_json::from_slice(value.value())?;
                entries.push(entry);
            }

            for entry in &entries {
                let value = serde_json::to_vec(&entry.review)?;
                pending_table.insert(entry.id, value.as_slice())?;
                dead_letter_table.remove(entry.id)?;
            }
            entries.len()
        };
        txn.commit()?;
        Ok(count)
    }

    // ========== Statistics ==========

    pub fn stats(&self) -> QueueResult<QueueStats> {
        let read_txn = self.db.begin_read()?;
        let pending_table = read_txn.open_table(PENDING_TABLE)?;
        let dead_letter_table = read_txn.open_table(DEAD_LETTER_TABLE)?;
        let seq_table = read_txn.open_table(SEQUENCE_TABLE)?;

        Ok(QueueStats {
            pending: pending_table.len()?,
            dead_letters: dead_letter_table.len()?,
            last_id: seq_table
                .get(REVIEW_ID_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0),
        })
    }
}

/// Queue statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    pub pending: u64,
    pub dead_letters: u64,
    pub last_id: u64,
}
