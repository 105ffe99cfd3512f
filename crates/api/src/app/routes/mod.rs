use axum::Router;

pub mod sessions;
pub mod system;

/// Router for all session-scoped endpoints.
pub fn router() -> Router {
    Router::new().nest("/sessions", sessions::router())
}
