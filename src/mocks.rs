//! Test doubles for the hasher and store collaborators.

use crate::hasher::{HashError, Hasher};
use crate::models::SecuredNote;
use crate::store::{CounterStore, MemoryStore, NoteStore, StoreError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Deterministic hasher: digest is `plain$<password>`
#[derive(Default)]
pub struct PlainHasher {
    verifications: AtomicUsize,
}

impl PlainHasher {
    pub fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}

impl Hasher for PlainHasher {
    fn digest(&self, password: &[u8]) -> Result<String, HashError> {
        Ok(format!("plain${}", String::from_utf8_lossy(password)))
    }

    fn verify(&self, digest: &str, candidate: &[u8]) -> bool {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        digest
            .strip_prefix("plain$")
            .map(|expected| expected.as_bytes() == candidate)
            .unwrap_or(false)
    }
}

/// Hasher whose entropy source is gone
pub struct BrokenHasher;

impl Hasher for BrokenHasher {
    fn digest(&self, _password: &[u8]) -> Result<String, HashError> {
        Err(HashError::Entropy)
    }

    fn verify(&self, _digest: &str, _candidate: &[u8]) -> bool {
        false
    }
}

/// Counter backend that is always down
pub struct BrokenCounter;

#[async_trait]
impl CounterStore for BrokenCounter {
    async fn increment_and_get(&self) -> Result<u64, StoreError> {
        Err(StoreError::DatabaseError("counter unavailable".to_string()))
    }
}

/// Wraps a [`MemoryStore`] and fails selected operations
pub struct FlakyNoteStore {
    pub inner: MemoryStore,
    pub fail_put: bool,
    pub fail_get: bool,
    pub fail_delete: bool,
}

impl FlakyNoteStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_put: false,
            fail_get: false,
            fail_delete: false,
        }
    }
}

fn down() -> StoreError {
    StoreError::DatabaseError("some error from database".to_string())
}

#[async_trait]
impl NoteStore for FlakyNoteStore {
    async fn put(&self, note: &SecuredNote) -> Result<(), StoreError> {
        if self.fail_put {
            return Err(down());
        }
        self.inner.put(note).await
    }

    async fn get(&self, id: &str) -> Result<Option<SecuredNote>, StoreError> {
        if self.fail_get {
            return Err(down());
        }
        self.inner.get(id).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        if self.fail_delete {
            return Err(down());
        }
        self.inner.delete(id).await
    }
}
