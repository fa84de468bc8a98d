use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints any client may call. Handlers that care about the caller take a
/// `Session` and answer with 401 themselves when it is empty.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /auth/check
        // Resolves the session cookie to the signed-in identity, or 401.
        .route("/auth/check", get(handlers::auth_check))
        // POST /projects/{id}/guest-heart/status
        // Heart status for an anonymous guest id sent in the body.
        .route(
            "/projects/{id}/guest-heart/status",
            post(handlers::guest_heart_status),
        )
}
