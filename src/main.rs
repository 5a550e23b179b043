//! Secure Notes server
//!
//! Serves password-protected notes that:
//! - expire after a caller-chosen lifetime
//! - optionally self-destruct after the first successful read
//! - keep only a salted digest of the password

use axum::Router;
use secure_notes::clock::{Clock, SystemClock};
use secure_notes::{build_router, build_state, Config, MemoryStore};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Initialize structured logging
    init_tracing();

    // Load configuration
    let config = Config::from_env();
    log_startup_info(&config);

    // Initialize core components
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(MemoryStore::new(clock.clone()));
    store.clone().start_cleanup_task(config.cleanup_interval);

    let state = match build_state(&config, store, clock) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    // Build and serve the application
    let app = build_router(state, &config);
    serve(app, &config).await;
}

/// Initialize tracing with environment-based log levels.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("secure_notes=debug,tower_http=info")),
        )
        .init();
}

/// Log startup configuration (no secrets).
fn log_startup_info(config: &Config) {
    info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        storage = "memory",
        id_min_length = config.id_min_length,
        argon2_m_cost = config.hasher.m_cost,
        argon2_t_cost = config.hasher.t_cost,
        max_note_size = config.max_note_size,
        request_timeout_secs = config.request_timeout.as_secs(),
        "Starting secure notes server"
    );
}

/// Bind to address and serve the application.
async fn serve(app: Router, config: &Config) {
    let bind_addr = format!("{}:{}", config.bind_addr, config.port);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %bind_addr, "Server listening");

    axum::serve(listener, app).await.expect("Server error");
}
