use crate::{
    AppState,
    auth::{CurrentUser, Session},
    error::{ApiError, ApiResult},
    models::{AuthCheckResponse, GuestHeartStatusRequest, HeartStatus},
    repository::RepositoryState,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use uuid::Uuid;

// Extraction failures are mapped to fixed messages so the client never sees its
// own input (or serde's description of it) reflected back.

fn parse_project_id(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::BadRequest("Invalid project identifier"))
}

async fn heart_status(
    repo: &RepositoryState,
    project_id: Uuid,
    hearted: bool,
) -> ApiResult<HeartStatus> {
    let heart_count = repo.heart_count(project_id).await?;
    Ok(HeartStatus {
        project_id,
        hearted,
        heart_count,
    })
}

// --- Handlers ---

/// auth_check
///
/// [Public Route] Reports who the caller is. Returns 401 when the session is absent,
/// expired or otherwise invalid.
#[utoipa::path(
    get,
    path = "/api/auth/check",
    responses(
        (status = 200, description = "Signed in", body = AuthCheckResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn auth_check(session: Session) -> ApiResult<Json<AuthCheckResponse>> {
    let user = session.require()?;
    Ok(Json(AuthCheckResponse {
        authenticated: true,
        user,
    }))
}

/// get_heart_status
///
/// [Authenticated Route] Whether the signed-in user has hearted the project, plus its total.
#[utoipa::path(
    get,
    path = "/api/projects/{id}/heart",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Heart status", body = HeartStatus),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_heart_status(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<HeartStatus>> {
    let project_id = parse_project_id(path)?;
    let hearted = state.repo.has_heart(project_id, user.id).await?;
    Ok(Json(heart_status(&state.repo, project_id, hearted).await?))
}

/// heart_project
///
/// [Authenticated Route] Hearts a project. Repeating the call is a no-op
/// (composite key on `project_hearts`), so the response is the same either way.
#[utoipa::path(
    post,
    path = "/api/projects/{id}/heart",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Hearted", body = HeartStatus),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn heart_project(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<HeartStatus>> {
    let project_id = parse_project_id(path)?;
    if !state.repo.project_exists(project_id).await? {
        return Err(ApiError::NotFound("Project"));
    }

    if state.repo.add_heart(project_id, user.id).await? {
        tracing::info!(%project_id, user_id = %user.id, "project hearted");
    }
    Ok(Json(heart_status(&state.repo, project_id, true).await?))
}

/// unheart_project
///
/// [Authenticated Route] Removes the signed-in user's heart, if any.
#[utoipa::path(
    delete,
    path = "/api/projects/{id}/heart",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Heart removed", body = HeartStatus),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn unheart_project(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<HeartStatus>> {
    let project_id = parse_project_id(path)?;
    if state.repo.remove_heart(project_id, user.id).await? {
        tracing::info!(%project_id, user_id = %user.id, "project heart removed");
    }
    Ok(Json(heart_status(&state.repo, project_id, false).await?))
}

/// guest_heart_status
///
/// [Public Route] Heart status for an anonymous guest identified by a client-generated id.
/// A missing or blank `guest_id` is a 400.
#[utoipa::path(
    post,
    path = "/api/projects/{id}/guest-heart/status",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = GuestHeartStatusRequest,
    responses(
        (status = 200, description = "Guest heart status", body = HeartStatus),
        (status = 400, description = "Missing guest identifier")
    )
)]
pub async fn guest_heart_status(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<GuestHeartStatusRequest>, JsonRejection>,
) -> ApiResult<Json<HeartStatus>> {
    let project_id = parse_project_id(path)?;
    let Json(payload) = payload.map_err(|_| ApiError::BadRequest("Invalid request body"))?;

    let guest_id = payload
        .guest_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::BadRequest("Missing guest identifier"))?;

    let hearted = state.repo.has_guest_heart(project_id, guest_id).await?;
    Ok(Json(heart_status(&state.repo, project_id, hearted).await?))
}

/// route_not_found
///
/// Fallback for paths that passed the admission gate but match no route.
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route")
}
