use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Admission control and identity.
pub mod auth;
pub mod gate;

// Request handling and persistence.
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod config;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::{AppConfig, GateConfig};
pub use error::{ApiError, ApiResult};
pub use gate::{Admission, AdmissionGate, RouteClass};
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every JSON handler, served under the API prefix so the
/// admission gate never redirects documentation requests.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth_check, handlers::get_heart_status, handlers::heart_project,
        handlers::unheart_project, handlers::guest_heart_status,
    ),
    components(
        schemas(
            models::Identity, models::AuthCheckResponse, models::HeartStatus,
            models::GuestHeartStatusRequest,
        )
    ),
    tags(
        (name = "augment-portal", description = "Project showcase API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable container for everything handlers and extractors need.
#[derive(Clone)]
pub struct AppState {
    /// Persistence, shared as a trait object so tests can substitute mocks.
    pub repo: RepositoryState,
    /// The loaded configuration, including the admission gate settings.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routes, the admission gate and the observability layers.
///
/// The gate is applied with `layer` (not `route_layer`) so it also sees paths that
/// match no route: page requests for protected paths are redirected to the login
/// page before the fallback would answer 404.
pub fn create_router(state: AppState) -> Router {
    let admission_gate = AdmissionGate::new(state.config.gate.clone());
    // Normalized by the gate, so it is always a valid `nest` path.
    let api_prefix = admission_gate.config().api_prefix.clone();

    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let api_routes = public::public_routes().merge(authenticated::authenticated_routes());

    let base_router = Router::new()
        .merge(
            SwaggerUi::new(format!("{api_prefix}/docs"))
                .url(format!("{api_prefix}/openapi.json"), ApiDoc::openapi()),
        )
        .nest(&api_prefix, api_routes)
        .fallback(handlers::route_not_found)
        // Every request passes the route classifier; protected ones need a session cookie.
        .layer(middleware::from_fn_with_state(
            admission_gate,
            gate::admission_middleware,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set by the outer layer
/// so every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        path = %request.uri().path(),
        req_id = %request_id,
    )
}
