//! Note creation.
//!
//! Turns a [`PlainNoteRequest`] into a persisted [`SecuredNote`]:
//!
//! 1. read the clock once and fix `expires_at = now + lifetime`
//! 2. digest the password (blocking pool)
//! 3. increment the note counter
//! 4. encode the counter value into the public id
//! 5. put the secured note
//!
//! Steps 2 and 3 run concurrently. Nothing is retried. If the put fails
//! after the counter moved, that counter value is burned: ids stay unique,
//! they just get less dense.

use crate::clock::Clock;
use crate::hasher::{digest_blocking, HashError, Hasher};
use crate::id_generator::IdGenerator;
use crate::models::{NoteId, PlainNoteRequest, SecuredNote};
use crate::store::{CounterStore, NoteStore, StoreError};
use std::sync::Arc;
use tracing::debug;

/// Creates secured notes
pub struct CreationService {
    hasher: Arc<dyn Hasher>,
    ids: IdGenerator,
    counter: Arc<dyn CounterStore>,
    notes: Arc<dyn NoteStore>,
    clock: Arc<dyn Clock>,
    max_note_size: usize,
}

impl CreationService {
    pub fn new(
        hasher: Arc<dyn Hasher>,
        ids: IdGenerator,
        counter: Arc<dyn CounterStore>,
        notes: Arc<dyn NoteStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            hasher,
            ids,
            counter,
            notes,
            clock,
            max_note_size: usize::MAX,
        }
    }

    /// Reject note texts longer than `max` bytes
    pub fn with_max_note_size(mut self, max: usize) -> Self {
        self.max_note_size = max;
        self
    }

    /// Secure and persist a note, returning its id
    pub async fn create_note(&self, request: PlainNoteRequest) -> Result<NoteId, CreateError> {
        if request.text.len() > self.max_note_size {
            return Err(CreateError::Validation("note text exceeds size limit"));
        }

        let now = self.clock.now().timestamp();
        let expires_at = i64::try_from(request.life_time_seconds)
            .ok()
            .and_then(|lifetime| now.checked_add(lifetime))
            .ok_or(CreateError::Validation("note lifetime out of range"))?;

        let digest = digest_blocking(Arc::clone(&self.hasher), request.password.into_bytes());
        let (digest, counter) = tokio::join!(digest, self.counter.increment_and_get());

        let password_digest = digest.map_err(CreateError::Hash)?;
        let counter = counter.map_err(CreateError::Counter)?;

        let note = SecuredNote {
            id: self.ids.encode(counter),
            text: request.text,
            password_digest,
            expires_at,
            one_time_read: request.one_time_read,
        };

        self.notes.put(&note).await.map_err(CreateError::Storage)?;

        debug!(
            note_id = %note.id,
            expires_at,
            one_time_read = note.one_time_read,
            "Created note"
        );

        Ok(note.id)
    }
}

/// Note creation errors, by failing stage
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("invalid note: {0}")]
    Validation(&'static str),

    #[error("generate password digest: {0}")]
    Hash(HashError),

    #[error("increment note counter: {0}")]
    Counter(StoreError),

    #[error("repository create secured note: {0}")]
    Storage(StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::{DEFAULT_ID_MIN_LENGTH, DEFAULT_ID_SALT};
    use crate::mocks::{BrokenCounter, BrokenHasher, FlakyNoteStore, PlainHasher};
    use crate::store::MemoryStore;
    use std::collections::HashSet;

    // 2020-03-22 15:00:00 UTC
    const T: i64 = 1_584_889_200;

    fn ids() -> IdGenerator {
        IdGenerator::new(DEFAULT_ID_SALT, DEFAULT_ID_MIN_LENGTH).unwrap()
    }

    fn hello(one_time_read: bool) -> PlainNoteRequest {
        PlainNoteRequest {
            text: "Hello World".to_string(),
            password: "abc".to_string(),
            life_time_seconds: 3600,
            one_time_read,
        }
    }

    struct Fixture {
        store: MemoryStore,
        service: CreationService,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(FixedClock::at(T));
        let store = MemoryStore::new(clock.clone());
        let service = CreationService::new(
            Arc::new(PlainHasher::default()),
            ids(),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            clock,
        );
        Fixture { store, service }
    }

    #[tokio::test]
    async fn create_note_persists_secured_note() {
        let f = fixture();

        let id = f.service.create_note(hello(true)).await.unwrap();
        assert_eq!(id, "qx2rx");

        let stored = f.store.get(&id).await.unwrap().unwrap();
        assert_eq!(
            stored,
            SecuredNote {
                id: "qx2rx".to_string(),
                text: "Hello World".to_string(),
                password_digest: "plain$abc".to_string(),
                expires_at: T + 3600,
                one_time_read: true,
            }
        );
    }

    #[tokio::test]
    async fn consecutive_notes_get_distinct_ids() {
        let f = fixture();

        let first = f.service.create_note(hello(false)).await.unwrap();
        let second = f.service.create_note(hello(false)).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(second, ids().encode(2));
    }

    #[tokio::test]
    async fn concurrent_creations_never_collide() {
        let f = fixture();
        let service = Arc::new(f.service);

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.create_note(hello(false)).await })
            })
            .collect();

        let mut seen = HashSet::new();
        for result in futures::future::join_all(handles).await {
            let id = result.unwrap().unwrap();
            assert!(seen.insert(id), "duplicate id");
        }

        assert_eq!(seen.len(), 64);
        assert_eq!(f.store.len(), 64);
    }

    #[tokio::test]
    async fn zero_lifetime_expires_at_creation_time() {
        let f = fixture();
        let mut req = hello(false);
        req.life_time_seconds = 0;

        let id = f.service.create_note(req).await.unwrap();

        // Already past expiry for the store
        assert!(f.store.get(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oversized_text_is_rejected() {
        let f = fixture();
        let service = f.service.with_max_note_size(5);

        let res = service.create_note(hello(false)).await;
        assert!(matches!(res, Err(CreateError::Validation(_))));

        // Counter is untouched
        assert_eq!(f.store.increment_and_get().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn overflowing_lifetime_is_rejected() {
        let f = fixture();
        let mut req = hello(false);
        req.life_time_seconds = u64::MAX;

        let res = f.service.create_note(req).await;
        assert!(matches!(res, Err(CreateError::Validation(_))));
    }

    #[tokio::test]
    async fn hash_failure_is_reported() {
        let clock = Arc::new(FixedClock::at(T));
        let store = MemoryStore::new(clock.clone());
        let service = CreationService::new(
            Arc::new(BrokenHasher),
            ids(),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            clock,
        );

        let res = service.create_note(hello(false)).await;
        assert!(matches!(res, Err(CreateError::Hash(HashError::Entropy))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn counter_failure_is_reported() {
        let clock = Arc::new(FixedClock::at(T));
        let store = MemoryStore::new(clock.clone());
        let service = CreationService::new(
            Arc::new(PlainHasher::default()),
            ids(),
            Arc::new(BrokenCounter),
            Arc::new(store.clone()),
            clock,
        );

        let err = service.create_note(hello(false)).await.unwrap_err();
        assert!(matches!(err, CreateError::Counter(_)));
        assert_eq!(
            err.to_string(),
            "increment note counter: database error: counter unavailable"
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn put_failure_burns_counter_value() {
        let clock = Arc::new(FixedClock::at(T));
        let store = MemoryStore::new(clock.clone());
        let mut flaky = FlakyNoteStore::new(store.clone());
        flaky.fail_put = true;

        let service = CreationService::new(
            Arc::new(PlainHasher::default()),
            ids(),
            Arc::new(store.clone()),
            Arc::new(flaky),
            clock,
        );

        let err = service.create_note(hello(false)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "repository create secured note: database error: some error from database"
        );

        // Counter value 1 was consumed without a note
        assert!(store.is_empty());
        assert_eq!(store.increment_and_get().await.unwrap(), 2);
    }
}
