//! Note retrieval.
//!
//! A note is returned only to a caller presenting the right password.
//! Absent, consumed and expired notes all look the same: [`GetError::NotFound`].
//!
//! The password is verified on every path, including ids that do not exist
//! (against a dummy digest), so a miss costs the same hashing work as a
//! wrong password. A note the store has already expired is absent, so any
//! password gets [`GetError::NotFound`]. While the store's TTL lags behind
//! the service clock, a wrong password on an expired note still gets
//! [`GetError::NotAuthorized`] and expiry is only revealed to the owner.
//!
//! One-time notes are deleted after a successful verification. Of several
//! concurrent readers only the one whose delete removed the note gets the
//! body; the others get [`GetError::NotFound`]. If the delete fails the body
//! is withheld and [`GetError::Cleanup`] is returned; the note stays in
//! place and the caller may retry.

use crate::clock::Clock;
use crate::hasher::{verify_blocking, HashError, Hasher};
use crate::models::Note;
use crate::store::{NoteStore, StoreError};
use std::sync::Arc;
use tracing::debug;

/// Input for the dummy digest used when a note is absent
const ABSENT_NOTE_PASSWORD: &[u8] = b"absent note";

/// Retrieves notes by id and password
pub struct RetrievalService {
    hasher: Arc<dyn Hasher>,
    notes: Arc<dyn NoteStore>,
    clock: Arc<dyn Clock>,
    dummy_digest: String,
}

impl RetrievalService {
    pub fn new(
        hasher: Arc<dyn Hasher>,
        notes: Arc<dyn NoteStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, HashError> {
        let dummy_digest = hasher.digest(ABSENT_NOTE_PASSWORD)?;

        Ok(Self {
            hasher,
            notes,
            clock,
            dummy_digest,
        })
    }

    /// Fetch a note, verifying `password` against its digest
    pub async fn get_note(&self, id: &str, password: &[u8]) -> Result<Note, GetError> {
        let stored = self.notes.get(id).await.map_err(GetError::Storage)?;

        let digest = stored
            .as_ref()
            .map(|note| note.password_digest.clone())
            .unwrap_or_else(|| self.dummy_digest.clone());
        let verified = verify_blocking(Arc::clone(&self.hasher), digest, password.to_vec())
            .await
            .map_err(GetError::Hash)?;

        let note = stored.ok_or(GetError::NotFound)?;
        if !verified {
            return Err(GetError::NotAuthorized);
        }

        // The store's TTL may lag behind
        if note.is_expired_at(self.clock.now().timestamp()) {
            return Err(GetError::NotFound);
        }

        if note.one_time_read {
            let removed = self
                .notes
                .delete(&note.id)
                .await
                .map_err(GetError::Cleanup)?;
            if !removed {
                debug!(note_id = %note.id, "One-time note consumed by another reader");
                return Err(GetError::NotFound);
            }
            debug!(note_id = %note.id, "Consumed one-time note");
        }

        Ok(Note::from(note))
    }
}

/// Note retrieval errors
#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error("note not found")]
    NotFound,

    #[error("wrong password")]
    NotAuthorized,

    #[error("repository get note: {0}")]
    Storage(StoreError),

    #[error("delete one-time note: {0}")]
    Cleanup(StoreError),

    #[error("verify password: {0}")]
    Hash(HashError),
}
