use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Heart endpoints for signed-in users. Each handler takes the `CurrentUser`
/// extractor, which validates the session token and loads the profile before the
/// handler body runs, rejecting with a 401 JSON body otherwise.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/POST/DELETE /projects/{id}/heart
        // Read, add (idempotent) or remove the caller's heart on a project.
        .route(
            "/projects/{id}/heart",
            get(handlers::get_heart_status)
                .post(handlers::heart_project)
                .delete(handlers::unheart_project),
        )
}
