use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Database Rows ---

/// User
///
/// A row of `public.profiles`, the canonical record behind an authenticated identity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    // Primary key, equal to the `sub` claim of the user's session token.
    pub id: Uuid,
    pub name: String,
    // Profile picture reference, if the user has one.
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

// --- Identity ---

/// Identity
///
/// The resolved, validated user behind a session. Produced by `auth::resolve_identity`
/// and handed to handlers through the `Session` and `CurrentUser` extractors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    /// Reference to the user's profile image.
    pub avatar_url: Option<String>,
    pub is_admin: bool,
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar_url: user.avatar_url,
            is_admin: user.is_admin,
        }
    }
}

// --- Request Payloads ---

/// GuestHeartStatusRequest
///
/// Body of `POST /api/projects/{id}/guest-heart/status`. The field is optional at the
/// serde level so a missing value becomes our own 400 rather than a framework 422.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct GuestHeartStatusRequest {
    /// Anonymous identifier the browser generated for this guest.
    #[schema(example = "guest-8f14e45f")]
    pub guest_id: Option<String>,
}

// --- Responses ---

/// AuthCheckResponse
///
/// Output of `GET /api/auth/check` for an authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
    pub user: Identity,
}

/// HeartStatus
///
/// Whether the caller (user or guest) has hearted a project, and the project's total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HeartStatus {
    pub project_id: Uuid,
    pub hearted: bool,
    // Signed-in hearts plus guest hearts.
    #[ts(type = "number")]
    pub heart_count: i64,
}
