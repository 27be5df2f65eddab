//! Login, refresh rotation, logout, lockout and account administration.

mod common;

use axum::http::StatusCode;
use becs_core::roles::Role;
use becs_db::repositories::UserRepo;
use common::{body_json, create_user, token_for, TEST_PASSWORD};
use serde_json::json;
use sqlx::PgPool;

async fn login(app: &common::TestApp, email: &str, password: &str) -> axum::response::Response {
    app.post_json(
        "/api/auth/login",
        None,
        json!({ "email": email, "password": password }),
    )
    .await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_tokens_and_user(pool: PgPool) {
    let user = create_user(&pool, "BECS001", Role::Director).await;
    let app = common::build_test_app(pool);

    // Email matching is case-insensitive.
    let response = login(&app, "BECS001@becs.test", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["expires_in"], 3600);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "director");
    assert!(json["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_and_unknown_email_are_401(pool: PgPool) {
    create_user(&pool, "BECS002", Role::Staff).await;
    let app = common::build_test_app(pool);

    let response = login(&app, "becs002@becs.test", "wrong-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = login(&app, "ghost@becs.test", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_account_cannot_log_in(pool: PgPool) {
    let user = create_user(&pool, "BECS003", Role::Staff).await;
    UserRepo::deactivate(&pool, user.id).await.unwrap();
    let app = common::build_test_app(pool);

    let response = login(&app, "becs003@becs.test", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_failures_lock_the_account(pool: PgPool) {
    create_user(&pool, "BECS004", Role::Staff).await;
    let app = common::build_test_app(pool);

    for _ in 0..5 {
        let response = login(&app, "becs004@becs.test", "wrong-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Locked even with the right password.
    let response = login(&app, "becs004@becs.test", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_lock_restores_full_allowance(pool: PgPool) {
    create_user(&pool, "BECS006", Role::Staff).await;
    let app = common::build_test_app(pool);

    for _ in 0..5 {
        login(&app, "becs006@becs.test", "wrong-password").await;
    }
    assert_eq!(
        login(&app, "becs006@becs.test", TEST_PASSWORD).await.status(),
        StatusCode::FORBIDDEN
    );

    // Let the lock run out.
    sqlx::query("UPDATE users SET locked_until = NOW() - INTERVAL '1 minute' WHERE staff_id = $1")
        .bind("BECS006")
        .execute(&app.pool)
        .await
        .unwrap();

    // One typo after the lock is an ordinary failure, not a new lock.
    let response = login(&app, "becs006@becs.test", "wrong-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = login(&app, "becs006@becs.test", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_and_old_token_is_rejected(pool: PgPool) {
    create_user(&pool, "BECS005", Role::Staff).await;
    let app = common::build_test_app(pool);

    let json = body_json(login(&app, "becs005@becs.test", TEST_PASSWORD).await).await;
    let original = json["refresh_token"].as_str().unwrap().to_string();

    let response = app
        .post_json("/api/auth/refresh", None, json!({ "refresh_token": original }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    assert_ne!(rotated["refresh_token"].as_str().unwrap(), original);

    let response = app
        .post_json("/api/auth/refresh", None, json!({ "refresh_token": original }))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_refresh_tokens(pool: PgPool) {
    create_user(&pool, "BECS006", Role::Staff).await;
    let app = common::build_test_app(pool);

    let json = body_json(login(&app, "becs006@becs.test", TEST_PASSWORD).await).await;
    let access = json["access_token"].as_str().unwrap();
    let refresh = json["refresh_token"].as_str().unwrap();

    let response = app.post_empty("/api/auth/logout", Some(access)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .post_json("/api/auth/refresh", None, json!({ "refresh_token": refresh }))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn current_user_returns_session_profile(pool: PgPool) {
    let user = create_user(&pool, "BECS007", Role::Staff).await;
    let app = common::build_test_app(pool);

    let response = app.get("/api/auth/user", Some(&token_for(&user))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["staff_id"], "BECS007");
    assert_eq!(json["data"]["role"], "staff");
}

// ---------------------------------------------------------------------------
// Account administration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn staff_cannot_create_users(pool: PgPool) {
    let staff = create_user(&pool, "BECS010", Role::Staff).await;
    let app = common::build_test_app(pool);

    let body = json!({
        "first_name": "New",
        "last_name": "Hire",
        "staff_id": "BECS011",
        "email": "new.hire@becs.test",
        "password": "password123",
    });
    let response = app.post_json("/api/users", Some(&token_for(&staff)), body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn director_creates_staff_but_not_admins(pool: PgPool) {
    let director = create_user(&pool, "BECS012", Role::Director).await;
    let app = common::build_test_app(pool);
    let token = token_for(&director);

    let body = json!({
        "first_name": "New",
        "last_name": "Hire",
        "staff_id": "BECS013",
        "email": "New.Hire@becs.test",
        "password": "password123",
    });
    let response = app.post_json("/api/users", Some(&token), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "staff");
    assert_eq!(json["data"]["email"], "new.hire@becs.test");

    let body = json!({
        "first_name": "Would",
        "last_name": "Be",
        "staff_id": "BECS014",
        "email": "would.be@becs.test",
        "password": "password123",
        "role": "admin",
    });
    let response = app.post_json("/api/users", Some(&token), body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_user_rejects_short_password_and_duplicate_email(pool: PgPool) {
    let admin = create_user(&pool, "ADMIN001", Role::Admin).await;
    create_user(&pool, "BECS015", Role::Staff).await;
    let app = common::build_test_app(pool);
    let token = token_for(&admin);

    let body = json!({
        "first_name": "Short",
        "last_name": "Pass",
        "staff_id": "BECS016",
        "email": "short.pass@becs.test",
        "password": "abc",
    });
    let response = app.post_json("/api/users", Some(&token), body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["fields"]["password"].is_array());

    let body = json!({
        "first_name": "Dup",
        "last_name": "Email",
        "staff_id": "BECS017",
        "email": "becs015@becs.test",
        "password": "password123",
    });
    let response = app.post_json("/api/users", Some(&token), body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn staff_may_edit_own_profile_only(pool: PgPool) {
    let staff = create_user(&pool, "BECS018", Role::Staff).await;
    let other = create_user(&pool, "BECS019", Role::Staff).await;
    let app = common::build_test_app(pool);
    let token = token_for(&staff);

    let response = app
        .put_json(
            &format!("/api/users/{}", staff.id),
            Some(&token),
            json!({ "phone_number": "+254700123018" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .put_json(
            &format!("/api/users/{}", staff.id),
            Some(&token),
            json!({ "role": "director" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .put_json(
            &format!("/api/users/{}", other.id),
            Some(&token),
            json!({ "phone_number": "+254700000000" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_deactivates_and_resets_passwords(pool: PgPool) {
    let admin = create_user(&pool, "ADMIN001", Role::Admin).await;
    let staff = create_user(&pool, "BECS020", Role::Staff).await;
    let app = common::build_test_app(pool);
    let token = token_for(&admin);

    let response = app
        .post_json(
            &format!("/api/users/{}/reset-password", staff.id),
            Some(&token),
            json!({ "new_password": "a-new-password" }),
        )
        .await;
    assert!(response.status().is_success());
    let response = login(&app, "becs020@becs.test", "a-new-password").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .delete(&format!("/api/users/{}", admin.id), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .delete(&format!("/api/users/{}", staff.id), Some(&token))
        .await;
    assert!(response.status().is_success());
    let response = login(&app, "becs020@becs.test", "a-new-password").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
