//! Data models for secure notes.
//!
//! Only the password is protected: note text is stored verbatim and the
//! password survives only as a salted one-way digest.

use serde::{Deserialize, Serialize};

/// Public note identifier (hashids-encoded counter value)
pub type NoteId = String;

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// Caller-supplied note, never persisted as-is
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainNoteRequest {
    pub text: String,
    pub password: String,
    /// Seconds until expiry, counted from creation time
    pub life_time_seconds: u64,
    #[serde(default)]
    pub one_time_read: bool,
}

/// Persisted note, owned by the note store once created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecuredNote {
    pub id: NoteId,
    pub text: String,
    /// Self-describing salted digest of the password
    pub password_digest: String,
    /// Absolute expiry, fixed at creation
    pub expires_at: Timestamp,
    pub one_time_read: bool,
}

impl SecuredNote {
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}

/// Retrieved note with the digest stripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    /// Absolute expiry (Unix seconds)
    #[serde(rename = "ttl")]
    pub expires_at: Timestamp,
}

impl From<SecuredNote> for Note {
    fn from(note: SecuredNote) -> Self {
        Self {
            id: note.id,
            text: note.text,
            expires_at: note.expires_at,
        }
    }
}

// === API Response Models ===

/// Create note response
#[derive(Debug, Serialize)]
pub struct CreateNoteResponse {
    pub id: NoteId,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}
