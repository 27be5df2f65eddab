//! `AppError` rendering: status codes and the `{error, code}` body.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use becs_api::error::AppError;
use becs_core::error::CoreError;
use http_body_util::BodyExt;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn not_found_names_entity_and_id() {
    let (status, body) = render(AppError::not_found("Project", 42)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["error"], "Project with id 42 not found");
}

#[tokio::test]
async fn domain_errors_map_to_statuses() {
    let cases = [
        (AppError::validation("bad"), StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        (AppError::conflict("taken"), StatusCode::CONFLICT, "CONFLICT"),
        (AppError::forbidden("no"), StatusCode::FORBIDDEN, "FORBIDDEN"),
        (
            AppError::Core(CoreError::Unauthorized("expired".into())),
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
        ),
        (
            AppError::Core(CoreError::TooLarge("50 MB max".into())),
            StatusCode::PAYLOAD_TOO_LARGE,
            "PAYLOAD_TOO_LARGE",
        ),
        (AppError::BadRequest("not json".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
    ];
    for (err, expected_status, expected_code) in cases {
        let (status, body) = render(err).await;
        assert_eq!(status, expected_status);
        assert_eq!(body["code"], expected_code);
        assert!(body.get("fields").is_none());
    }
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let (status, body) = render(AppError::InternalError("disk path /srv/x".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert_eq!(body["error"], "An internal error occurred");

    let (status, _) = render(AppError::Database(sqlx::Error::PoolTimedOut)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn missing_row_is_not_found() {
    let (status, body) = render(AppError::Database(sqlx::Error::RowNotFound)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn field_errors_carry_messages() {
    let mut fields = BTreeMap::new();
    fields.insert(
        "password".to_string(),
        vec!["Password must be at least 8 characters".to_string()],
    );
    let (status, body) = render(AppError::Fields(fields)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["fields"]["password"][0],
        "Password must be at least 8 characters"
    );
}
