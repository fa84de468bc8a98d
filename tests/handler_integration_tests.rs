mod common;

use augment_portal::{
    ApiError,
    auth::{CurrentUser, Session},
    handlers,
    models::{GuestHeartStatusRequest, Identity},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use common::{MockRepo, TEST_PROJECT_ID, TEST_USER_ID, body_json, test_state, test_user};
use uuid::Uuid;

fn signed_in() -> CurrentUser {
    CurrentUser(Identity::from(test_user()))
}

fn guest_body(guest_id: Option<&str>) -> Result<Json<GuestHeartStatusRequest>, JsonRejection> {
    Ok(Json(GuestHeartStatusRequest {
        guest_id: guest_id.map(str::to_string),
    }))
}

// --- auth_check ---

#[tokio::test]
async fn test_auth_check_returns_identity() {
    let session = Session {
        identity: Some(Identity::from(test_user())),
    };

    let Json(response) = handlers::auth_check(session).await.unwrap();

    assert!(response.authenticated);
    assert_eq!(response.user.id, TEST_USER_ID);
}

#[tokio::test]
async fn test_auth_check_without_identity_is_401() {
    let err = handlers::auth_check(Session { identity: None })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Not authenticated");
}

// --- Hearts ---

#[tokio::test]
async fn test_heart_status_reports_user_heart_and_total() {
    let other_user = Uuid::from_u128(7);
    let state = test_state(
        MockRepo::default()
            .with_project(TEST_PROJECT_ID)
            .with_heart(TEST_PROJECT_ID, TEST_USER_ID)
            .with_heart(TEST_PROJECT_ID, other_user)
            .with_guest_heart(TEST_PROJECT_ID, "guest-1"),
    );

    let Json(status) =
        handlers::get_heart_status(signed_in(), State(state), Ok(Path(TEST_PROJECT_ID)))
            .await
            .unwrap();

    assert_eq!(status.project_id, TEST_PROJECT_ID);
    assert!(status.hearted);
    assert_eq!(status.heart_count, 3);
}

#[tokio::test]
async fn test_heart_status_when_not_hearted() {
    let state = test_state(MockRepo::default().with_project(TEST_PROJECT_ID));

    let Json(status) =
        handlers::get_heart_status(signed_in(), State(state), Ok(Path(TEST_PROJECT_ID)))
            .await
            .unwrap();

    assert!(!status.hearted);
    assert_eq!(status.heart_count, 0);
}

#[tokio::test]
async fn test_heart_project_is_idempotent() {
    let state = test_state(MockRepo::default().with_project(TEST_PROJECT_ID));

    let Json(first) =
        handlers::heart_project(signed_in(), State(state.clone()), Ok(Path(TEST_PROJECT_ID)))
            .await
            .unwrap();
    let Json(second) =
        handlers::heart_project(signed_in(), State(state), Ok(Path(TEST_PROJECT_ID)))
            .await
            .unwrap();

    assert!(first.hearted);
    assert_eq!(first, second);
    assert_eq!(second.heart_count, 1);
}

#[tokio::test]
async fn test_heart_unknown_project_is_404() {
    let state = test_state(MockRepo::default());

    let err = handlers::heart_project(signed_in(), State(state), Ok(Path(TEST_PROJECT_ID)))
        .await
        .unwrap_err();

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Project not found");
}

#[tokio::test]
async fn test_unheart_project_removes_heart() {
    let state = test_state(
        MockRepo::default()
            .with_project(TEST_PROJECT_ID)
            .with_heart(TEST_PROJECT_ID, TEST_USER_ID),
    );

    let Json(status) =
        handlers::unheart_project(signed_in(), State(state), Ok(Path(TEST_PROJECT_ID)))
            .await
            .unwrap();

    assert!(!status.hearted);
    assert_eq!(status.heart_count, 0);
}

#[tokio::test]
async fn test_heart_status_database_failure_is_generic_500() {
    let state = test_state(MockRepo::failing());

    let err = handlers::get_heart_status(signed_in(), State(state), Ok(Path(TEST_PROJECT_ID)))
        .await
        .unwrap_err();

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Internal server error");
    assert!(!body.to_string().contains("pool"));
}

// --- Guest hearts ---

#[tokio::test]
async fn test_guest_heart_status_found() {
    let state = test_state(
        MockRepo::default()
            .with_project(TEST_PROJECT_ID)
            .with_guest_heart(TEST_PROJECT_ID, "guest-1"),
    );

    let Json(status) = handlers::guest_heart_status(
        State(state),
        Ok(Path(TEST_PROJECT_ID)),
        guest_body(Some("guest-1")),
    )
    .await
    .unwrap();

    assert!(status.hearted);
    assert_eq!(status.heart_count, 1);
}

#[tokio::test]
async fn test_guest_heart_status_other_guest() {
    let state = test_state(
        MockRepo::default()
            .with_project(TEST_PROJECT_ID)
            .with_guest_heart(TEST_PROJECT_ID, "guest-1"),
    );

    let Json(status) = handlers::guest_heart_status(
        State(state),
        Ok(Path(TEST_PROJECT_ID)),
        guest_body(Some("guest-2")),
    )
    .await
    .unwrap();

    assert!(!status.hearted);
    assert_eq!(status.heart_count, 1);
}

#[tokio::test]
async fn test_guest_heart_status_missing_guest_id_is_400() {
    for guest_id in [None, Some(""), Some("   ")] {
        let state = test_state(MockRepo::default());

        let err = handlers::guest_heart_status(
            State(state),
            Ok(Path(TEST_PROJECT_ID)),
            guest_body(guest_id),
        )
        .await
        .unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Missing guest identifier");
    }
}
