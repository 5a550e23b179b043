//! # Secure Notes
//!
//! Password-protected notes with expiry and one-time-read destruction.
//!
//! ## Design Principles
//!
//! - **Password never stored**: only a salted Argon2id digest is kept
//! - **Opaque ids**: a shared counter encoded with hashids, unique without lookups
//! - **Expiry by the store**: notes past their TTL are never returned
//! - **Read once**: one-time notes are deleted after the first authorized read
//! - **Minimal logging**: no note text, passwords or digests ever logged
//!
//! ## Architecture
//!
//! ```text
//!              ┌──────────────────┐      ┌───────────────┐
//! POST ───────▶│ CreationService  │─────▶│ CounterStore  │
//!              │                  │      └───────────────┘
//!              │                  │──┐
//!              └──────────────────┘  │   ┌───────────────┐
//!              ┌──────────────────┐  └──▶│   NoteStore   │
//! GET  ───────▶│ RetrievalService │─────▶│  (TTL expiry) │
//!              └──────────────────┘      └───────────────┘
//! ```
//!
//! ## API Overview
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/health` | GET | Health check |
//! | `/v1/notes` | POST | Create note |
//! | `/v1/notes/:id` | GET | Read note (`password` header) |

pub mod clock;
pub mod config;
pub mod creating;
pub mod getting;
pub mod handlers;
pub mod hasher;
pub mod id_generator;
pub mod models;
pub mod store;

#[cfg(test)]
mod mocks;

pub use config::Config;
pub use handlers::AppState;
pub use store::MemoryStore;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use clock::Clock;
use creating::CreationService;
use getting::RetrievalService;
use hasher::{Argon2Hasher, HashError, Hasher};
use id_generator::IdGenerator;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Wire both services to a single in-memory store.
pub fn build_state(
    config: &Config,
    store: Arc<MemoryStore>,
    clock: Arc<dyn Clock>,
) -> Result<AppState, SetupError> {
    let hasher: Arc<dyn Hasher> = Arc::new(Argon2Hasher::new(&config.hasher)?);
    let ids = IdGenerator::from_config(config)?;

    let creator = CreationService::new(
        hasher.clone(),
        ids,
        store.clone(),
        store.clone(),
        clock.clone(),
    )
    .with_max_note_size(config.max_note_size);
    let getter = RetrievalService::new(hasher, store, clock)?;

    Ok(AppState::new(creator, getter))
}

/// Build the Axum router with all endpoints and middleware.
pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // API v1 endpoints
        .route("/v1/notes", post(handlers::create_note))
        .route("/v1/notes/:id", get(handlers::get_note))
        .layer(DefaultBodyLimit::max(config.max_body_size()))
        // Middleware stack (top = outermost)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST])
                        .allow_headers([
                            header::CONTENT_TYPE,
                            HeaderName::from_static(handlers::PASSWORD_HEADER),
                        ]),
                )
                .layer(TimeoutLayer::new(config.request_timeout)),
        )
        .with_state(state)
}

/// Start-up errors
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Hasher(#[from] HashError),

    #[error("invalid identifier settings: {0}")]
    IdGenerator(#[from] harsh::BuildError),
}
