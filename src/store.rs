//! Storage collaborators and the in-memory backend.
//!
//! The services only see two traits:
//!
//! - [`CounterStore`]: a single durable counter with atomic increment-and-get.
//!   This is the one serialization point between concurrent creators.
//! - [`NoteStore`]: put/get/delete of secured notes keyed by id, with
//!   store-side expiry. Single-key read-your-writes is all that is required.
//!
//! [`MemoryStore`] implements both. Notes past `expires_at` are never returned
//! and are swept by a background task. Data is lost on restart.

use crate::clock::Clock;
use crate::models::{NoteId, SecuredNote};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Source of a strictly increasing integer sequence
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment the counter and return the new value. First call returns 1.
    async fn increment_and_get(&self) -> Result<u64, StoreError>;
}

/// Key-value store of secured notes
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn put(&self, note: &SecuredNote) -> Result<(), StoreError>;

    /// `Ok(None)` when the note is absent or already expired
    async fn get(&self, id: &str) -> Result<Option<SecuredNote>, StoreError>;

    /// `Ok(true)` only for the call that actually removed the note.
    /// Deleting an absent note is not an error
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

/// Thread-safe in-memory store
#[derive(Clone)]
pub struct MemoryStore {
    /// Secured notes by id
    notes: Arc<DashMap<NoteId, SecuredNote>>,

    /// Note counter (implicitly 0 before first increment)
    counter: Arc<AtomicU64>,

    /// Time source for expiry
    clock: Arc<dyn Clock>,

    /// Metrics (aggregate only, no note data)
    metrics: Arc<RwLock<StoreMetrics>>,
}

/// Aggregate metrics (no note data)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreMetrics {
    pub total_notes_stored: u64,
    pub total_notes_deleted: u64,
    pub total_notes_expired: u64,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            notes: Arc::new(DashMap::new()),
            counter: Arc::new(AtomicU64::new(0)),
            clock,
            metrics: Arc::new(RwLock::new(StoreMetrics::default())),
        }
    }

    /// Start background expiry sweep
    pub fn start_cleanup_task(self: Arc<Self>, interval: Duration) {
        let store = self.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                store.cleanup_expired().await;
            }
        });

        info!(
            interval_secs = interval.as_secs(),
            "Started TTL cleanup task"
        );
    }

    /// Number of notes held, expired or not
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Remove expired notes, returning how many were removed
    pub async fn cleanup_expired(&self) -> u64 {
        let now = self.clock.now().timestamp();

        let before = self.notes.len();
        self.notes.retain(|_, note| !note.is_expired_at(now));
        let expired = before.saturating_sub(self.notes.len()) as u64;

        if expired > 0 {
            let mut metrics = self.metrics.write().await;
            metrics.total_notes_expired += expired;
            debug!(expired, "Cleaned up expired notes");
        }

        expired
    }

    /// Get aggregate metrics
    pub async fn get_metrics(&self) -> StoreMetrics {
        self.metrics.read().await.clone()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn increment_and_get(&self) -> Result<u64, StoreError> {
        self.counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .map(|previous| previous + 1)
            .map_err(|_| StoreError::CounterExhausted)
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn put(&self, note: &SecuredNote) -> Result<(), StoreError> {
        self.notes.insert(note.id.clone(), note.clone());

        {
            let mut metrics = self.metrics.write().await;
            metrics.total_notes_stored += 1;
        }

        debug!(note_id = %note.id, expires_at = note.expires_at, "Stored note");

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<SecuredNote>, StoreError> {
        let now = self.clock.now().timestamp();

        Ok(self
            .notes
            .get(id)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value().clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self.notes.remove(id).is_some();
        if removed {
            let mut metrics = self.metrics.write().await;
            metrics.total_notes_deleted += 1;
            debug!(note_id = %id, "Deleted note");
        }

        Ok(removed)
    }
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("note counter exhausted")]
    CounterExhausted,

    #[error("database error: {0}")]
    DatabaseError(String),
}
