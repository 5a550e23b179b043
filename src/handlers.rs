//! HTTP request handlers for the secure notes API.
//!
//! Handlers only translate between HTTP and the services:
//! - note text, passwords and digests are never logged
//! - failures map onto status codes, see [`ApiError`]

use crate::creating::{CreateError, CreationService};
use crate::getting::{GetError, RetrievalService};
use crate::models::{
    CreateNoteResponse, ErrorResponse, HealthResponse, Note, NoteId, PlainNoteRequest,
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Request header carrying the note password
pub const PASSWORD_HEADER: &str = "password";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub creator: Arc<CreationService>,
    pub getter: Arc<RetrievalService>,
}

impl AppState {
    pub fn new(creator: CreationService, getter: RetrievalService) -> Self {
        Self {
            creator: Arc::new(creator),
            getter: Arc::new(getter),
        }
    }
}

// === Health Check ===

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// === Note Creation ===

/// POST /v1/notes - Create a password-protected note
pub async fn create_note(
    State(state): State<AppState>,
    Json(req): Json<PlainNoteRequest>,
) -> Result<(StatusCode, Json<CreateNoteResponse>), ApiError> {
    let id = state.creator.create_note(req).await?;

    debug!(note_id = %id, "Note created");

    Ok((StatusCode::CREATED, Json(CreateNoteResponse { id })))
}

// === Note Retrieval ===

/// GET /v1/notes/:id - Read a note
///
/// The password travels in the `password` header. A missing header is
/// treated as an empty password.
pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<NoteId>,
    headers: HeaderMap,
) -> Result<Json<Note>, ApiError> {
    let password = headers
        .get(PASSWORD_HEADER)
        .map(|value| value.as_bytes())
        .unwrap_or_default();

    let note = state.getter.get_note(&id, password).await?;

    Ok(Json(note))
}

// === Error Handling ===

/// API error types
#[derive(Debug)]
pub enum ApiError {
    InvalidInput(&'static str),
    NotFound,
    Unauthorized,
    Internal,
}

impl From<CreateError> for ApiError {
    fn from(err: CreateError) -> Self {
        match err {
            CreateError::Validation(msg) => ApiError::InvalidInput(msg),
            other => {
                error!(error = %other, "Failed to create note");
                ApiError::Internal
            }
        }
    }
}

impl From<GetError> for ApiError {
    fn from(err: GetError) -> Self {
        match err {
            GetError::NotFound => ApiError::NotFound,
            GetError::NotAuthorized => {
                warn!("Note password verification failed");
                ApiError::Unauthorized
            }
            other => {
                error!(error = %other, "Failed to get note");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOTE_NOT_FOUND", "note not found"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "wrong password"),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal server error",
            ),
        };

        let body = Json(ErrorResponse {
            error: message.to_string(),
            code,
        });

        (status, body).into_response()
    }
}
