//! HTTP API application wiring (Axum router + session store).
//!
//! - `sessions.rs`: the in-memory ledgers, one per session
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use paydesk_wallet::WalletConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod sessions;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: WalletConfig) -> Router {
    let sessions = Arc::new(sessions::SessionStore::new(config));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(sessions))
}
