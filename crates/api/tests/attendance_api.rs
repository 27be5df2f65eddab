//! Clock-in / clock-out and attendance reads.

mod common;

use axum::http::StatusCode;
use becs_core::roles::Role;
use common::{body_json, create_user, token_for};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn clock_in_then_out(pool: PgPool) {
    let staff = create_user(&pool, "BECS001", Role::Staff).await;
    let app = common::build_test_app(pool);
    let token = token_for(&staff);

    let response = app.post_empty("/api/attendance/clock-in", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let record = body_json(response).await["data"].clone();
    assert_eq!(record["user_id"], staff.id);
    assert!(record["date"].is_string());
    assert!(record["time_in"].is_string());
    assert!(record["time_out"].is_null());

    // A second open record is refused.
    let response = app.post_empty("/api/attendance/clock-in", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.post_empty("/api/attendance/clock-out", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let closed = body_json(response).await["data"].clone();
    assert_eq!(closed["id"], record["id"]);
    assert!(closed["time_out"].is_string());
    assert!(closed["total_hours"].as_f64().unwrap() >= 0.0);

    let response = app.post_empty("/api/attendance/clock-out", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .get(&format!("/api/attendance/today/{}", staff.id), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = app.get("/api/attendance/summary", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await["data"].clone();
    assert_eq!(summary["days_recorded"], 1);
    assert_eq!(summary["days_completed"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn staff_only_read_their_own_attendance(pool: PgPool) {
    let staff = create_user(&pool, "BECS001", Role::Staff).await;
    let other = create_user(&pool, "BECS002", Role::Staff).await;
    let director = create_user(&pool, "DIR001", Role::Director).await;
    let app = common::build_test_app(pool);

    app.post_empty("/api/attendance/clock-in", Some(&token_for(&staff)))
        .await;
    app.post_empty("/api/attendance/clock-in", Some(&token_for(&other)))
        .await;

    let response = app.get("/api/attendance", Some(&token_for(&staff))).await;
    let records = body_json(response).await["data"].clone();
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["user_id"], staff.id);

    let response = app
        .get(
            &format!("/api/attendance?user_id={}", other.id),
            Some(&token_for(&staff)),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .get(
            &format!("/api/attendance/today/{}", other.id),
            Some(&token_for(&staff)),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/api/attendance", Some(&token_for(&director))).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn inverted_date_range_is_rejected(pool: PgPool) {
    let staff = create_user(&pool, "BECS001", Role::Staff).await;
    let app = common::build_test_app(pool);

    let response = app
        .get(
            "/api/attendance?from=2025-06-30&to=2025-06-01",
            Some(&token_for(&staff)),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
