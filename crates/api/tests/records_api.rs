//! Invoices, the template library, bulk import and dashboard stats.

mod common;

use axum::http::header::CONTENT_DISPOSITION;
use axum::http::StatusCode;
use becs_core::project::ProjectType;
use becs_core::roles::Role;
use common::{body_bytes, body_json, create_project, create_user, token_for};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn invoice_lifecycle(pool: PgPool) {
    let director = create_user(&pool, "DIR001", Role::Director).await;
    let staff = create_user(&pool, "BECS001", Role::Staff).await;
    let project = create_project(&pool, "P1", ProjectType::Private, None).await;
    let app = common::build_test_app(pool);

    let body = json!({
        "project_id": project.id,
        "invoice_number": "INV-2025-001",
        "amount_cents": 1_250_000,
        "due_date": "2030-01-31",
    });

    let response = app
        .post_json("/api/invoices", Some(&token_for(&staff)), body.clone())
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_json("/api/invoices", Some(&token_for(&director)), body.clone())
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let invoice = body_json(response).await["data"].clone();
    assert_eq!(invoice["status"], "unpaid");
    assert_eq!(invoice["amount_cents"], 1_250_000);
    let id = invoice["id"].as_i64().unwrap();

    let response = app
        .post_json("/api/invoices", Some(&token_for(&director)), body)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Reads are open to every signed-in user.
    let response = app
        .get(&format!("/api/invoices/{id}"), Some(&token_for(&staff)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .put_json(
            &format!("/api/invoices/{id}"),
            Some(&token_for(&director)),
            json!({ "status": "paid" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "paid");

    let response = app
        .get("/api/invoices?status=unpaid", Some(&token_for(&staff)))
        .await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());

    let response = app
        .delete(&format!("/api/invoices/{id}"), Some(&token_for(&director)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app
        .get(&format!("/api/invoices/{id}"), Some(&token_for(&director)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn negative_amount_is_rejected(pool: PgPool) {
    let admin = create_user(&pool, "ADMIN001", Role::Admin).await;
    let project = create_project(&pool, "P1", ProjectType::Private, None).await;
    let app = common::build_test_app(pool);

    let response = app
        .post_json(
            "/api/invoices",
            Some(&token_for(&admin)),
            json!({
                "project_id": project.id,
                "invoice_number": "INV-1",
                "amount_cents": -5,
                "due_date": "2030-01-31",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invoice_summary_lists_every_status(pool: PgPool) {
    let admin = create_user(&pool, "ADMIN001", Role::Admin).await;
    let project = create_project(&pool, "P1", ProjectType::Private, None).await;
    let app = common::build_test_app(pool);
    let token = token_for(&admin);

    for (number, amount) in [("INV-1", 1000), ("INV-2", 2500)] {
        app.post_json(
            "/api/invoices",
            Some(&token),
            json!({
                "project_id": project.id,
                "invoice_number": number,
                "amount_cents": amount,
                "due_date": "2030-01-31",
            }),
        )
        .await;
    }

    let response = app.get("/api/invoices/summary", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await["data"].clone();
    let rows = summary.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    let unpaid = rows.iter().find(|r| r["status"] == "unpaid").unwrap();
    assert_eq!(unpaid["count"], 2);
    assert_eq!(unpaid["amount_cents"], 3500);
    let paid = rows.iter().find(|r| r["status"] == "paid").unwrap();
    assert_eq!(paid["count"], 0);
    assert_eq!(paid["amount_cents"], 0);
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn template_upload_list_download_delete(pool: PgPool) {
    let owner = create_user(&pool, "BECS001", Role::Staff).await;
    let other = create_user(&pool, "BECS002", Role::Staff).await;
    let app = common::build_test_app(pool);

    let response = app
        .post_file(
            "/api/templates/upload",
            Some(&token_for(&owner)),
            "monthly.docx",
            b"monthly report body",
            &[("category", "Reports"), ("description", "Monthly report")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let template = body_json(response).await["data"].clone();
    assert_eq!(template["name"], "monthly.docx");
    assert_eq!(template["category"], "Reports");
    assert_eq!(template["file_size"], 19);
    assert!(template.get("stored_file_path").is_none());
    let id = template["id"].as_i64().unwrap();

    let response = app
        .post_file(
            "/api/templates/upload",
            Some(&token_for(&other)),
            "letter.docx",
            b"dear sir",
            &[("name", "Cover letter")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["category"], "Other");

    let response = app
        .get("/api/templates?category=Reports", Some(&token_for(&other)))
        .await;
    let listed = body_json(response).await["data"].clone();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], id);

    let response = app
        .get(&format!("/api/templates/{id}/download"), Some(&token_for(&other)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains("monthly.docx"));
    assert_eq!(body_bytes(response).await, b"monthly report body");

    let response = app
        .delete(&format!("/api/templates/{id}"), Some(&token_for(&other)))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .delete(&format!("/api/templates/{id}"), Some(&token_for(&owner)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app
        .get(&format!("/api/templates/{id}/download"), Some(&token_for(&owner)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn template_upload_rejects_bad_input(pool: PgPool) {
    let staff = create_user(&pool, "BECS001", Role::Staff).await;
    let app = common::build_test_app(pool);
    let token = token_for(&staff);

    let response = app
        .post_file(
            "/api/templates/upload",
            Some(&token),
            "x.docx",
            b"body",
            &[("category", "Recipes")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .post_file("/api/templates/upload", Some(&token), "empty.docx", b"", &[])
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let too_big = vec![b'x'; common::TEST_MAX_UPLOAD_BYTES as usize + 1];
    let response = app
        .post_file("/api/templates/upload", Some(&token), "big.docx", &too_big, &[])
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// ---------------------------------------------------------------------------
// Bulk import
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn staff_import_reports_row_errors(pool: PgPool) {
    let admin = create_user(&pool, "ADMIN001", Role::Admin).await;
    let staff = create_user(&pool, "BECS001", Role::Staff).await;
    let app = common::build_test_app(pool);

    let csv = "firstName,lastName,email,staffId,role,password\n\
Amina,Otieno,amina@becs.test,BECS020,staff,password123\n\
Brian,Kamau,not-an-email,BECS021,staff,password123\n\
Carol,Wanjiru,becs001@becs.test,BECS022,staff,password123";
    let body = json!({ "import_type": "staff", "csv_data": csv });

    let response = app
        .post_json("/api/bulk-import", Some(&token_for(&staff)), body.clone())
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_json("/api/bulk-import", Some(&token_for(&admin)), body)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let report = body_json(response).await["data"].clone();
    assert_eq!(report["import_type"], "staff");
    assert_eq!(report["total_rows"], 3);
    assert_eq!(report["created"], 1);
    let errors = report["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["row"], 2);
    assert_eq!(errors[1]["row"], 3);
    assert!(errors[1]["message"].as_str().unwrap().starts_with("Duplicate value"));

    // The imported account can sign in.
    let response = app
        .post_json(
            "/api/auth/login",
            None,
            json!({ "email": "amina@becs.test", "password": "password123" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn director_cannot_import_admins(pool: PgPool) {
    let director = create_user(&pool, "DIR001", Role::Director).await;
    let app = common::build_test_app(pool);

    let csv = "firstName,lastName,email,staffId,role,password\n\
Eve,Mutua,eve@becs.test,ADMIN009,admin,password123";
    let response = app
        .post_json(
            "/api/bulk-import",
            Some(&token_for(&director)),
            json!({ "import_type": "staff", "csv_data": csv }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await["data"].clone();
    assert_eq!(report["created"], 0);
    assert_eq!(report["errors"][0]["row"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn task_import_resolves_codes(pool: PgPool) {
    let director = create_user(&pool, "DIR001", Role::Director).await;
    create_user(&pool, "BECS001", Role::Staff).await;
    let project = create_project(&pool, "P1", ProjectType::Private, None).await;
    let app = common::build_test_app(pool);

    let csv = "title,projectCode,assignedTo,targetDate\n\
Baseline survey,P1,BECS001,2030-03-01\n\
Orphan task,NOPE,,\n\
Ghost assignee,P1,BECS999,";
    let response = app
        .post_json(
            "/api/bulk-import",
            Some(&token_for(&director)),
            json!({ "import_type": "tasks", "csv_data": csv }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let report = body_json(response).await["data"].clone();
    assert_eq!(report["created"], 1);
    let errors = report["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors[0]["message"].as_str().unwrap().contains("NOPE"));
    assert!(errors[1]["message"].as_str().unwrap().contains("BECS999"));

    let response = app
        .get(
            &format!("/api/projects/{}/progress", project.id),
            Some(&token_for(&director)),
        )
        .await;
    assert_eq!(body_json(response).await["data"]["tasks"]["total"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn import_requires_known_columns(pool: PgPool) {
    let admin = create_user(&pool, "ADMIN001", Role::Admin).await;
    let app = common::build_test_app(pool);

    let response = app
        .post_json(
            "/api/bulk-import",
            Some(&token_for(&admin)),
            json!({ "import_type": "projects", "csv_data": "name,code\nSolar,S1" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .post_json(
            "/api/bulk-import",
            Some(&token_for(&admin)),
            json!({ "import_type": "payroll", "csv_data": "a\nb" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn dashboard_stats(pool: PgPool) {
    let staff = create_user(&pool, "BECS001", Role::Staff).await;
    create_project(&pool, "P1", ProjectType::Private, None).await;
    let app = common::build_test_app(pool);

    let response = app.get("/api/dashboard/stats", Some(&token_for(&staff))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await["data"].clone();
    assert_eq!(stats["projects"]["total"], 1);
    assert_eq!(stats["projects"]["private"], 1);
    assert_eq!(stats["staff"]["total_active"], 1);
    assert_eq!(stats["tasks"]["total"], 0);
    assert_eq!(stats["pending_leave_applications"], 0);

    let response = app.get("/api/dashboard/stats", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
