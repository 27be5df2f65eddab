//! Shared helpers for the HTTP integration tests.
//!
//! Every test builds the app through [`build_app_router`] so it runs the same
//! middleware stack as the binary, with file storage in a temporary directory.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use becs_api::auth::jwt::{generate_access_token, JwtConfig};
use becs_api::auth::password::hash_password;
use becs_api::config::ServerConfig;
use becs_api::router::build_app_router;
use becs_api::state::AppState;
use becs_core::project::{Consortium, ProjectStatus, ProjectType};
use becs_core::roles::Role;
use becs_core::task_workflow::TaskPriority;
use becs_core::types::{Date, DbId};
use becs_db::models::project::{CreateProject, Project};
use becs_db::models::task::{CreateTask, Task};
use becs_db::models::user::{CreateUser, User};
use becs_db::repositories::{ProjectRepo, TaskRepo, UserRepo};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

/// Password given to every user created by [`create_user`].
pub const TEST_PASSWORD: &str = "password123";

/// Upload cap used by the tests, small enough to exceed cheaply.
pub const TEST_MAX_UPLOAD_BYTES: u64 = 4 * 1024;

const MULTIPART_BOUNDARY: &str = "becs-test-boundary";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry_mins: 60,
        refresh_token_expiry_days: 7,
    }
}

pub fn test_config(storage: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        storage_root: storage.path().to_path_buf(),
        max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
        bootstrap_admin: None,
        jwt: test_jwt_config(),
    }
}

/// The router plus the temporary storage directory it writes into.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub storage: TempDir,
}

pub fn build_test_app(pool: PgPool) -> TestApp {
    let storage = tempfile::tempdir().expect("temp dir");
    let state = AppState::new(pool.clone(), test_config(&storage));
    TestApp {
        router: build_app_router(state),
        pool,
        storage,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(request(Method::GET, uri, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(request(Method::DELETE, uri, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_empty(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(request(Method::POST, uri, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response {
        self.json(Method::POST, uri, token, body).await
    }

    pub async fn put_json(&self, uri: &str, token: Option<&str>, body: serde_json::Value) -> Response {
        self.json(Method::PUT, uri, token, body).await
    }

    pub async fn patch_json(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response {
        self.json(Method::PATCH, uri, token, body).await
    }

    async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response {
        let request = request(method, uri, token)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// POST a multipart form with one `file` part and the given text fields.
    pub async fn post_file(
        &self,
        uri: &str,
        token: Option<&str>,
        file_name: &str,
        data: &[u8],
        fields: &[(&str, &str)],
    ) -> Response {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

        let request = request(Method::POST, uri, token)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

impl TestApp {
    /// POST a multipart body that declares its full length up front, the way
    /// a browser does for a file upload.
    pub async fn post_sized_upload(&self, uri: &str, token: Option<&str>, size: usize) -> Response {
        let request = request(Method::POST, uri, token)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .header(CONTENT_LENGTH, size)
            .body(Body::from(vec![b'x'; size]))
            .unwrap();
        self.send(request).await
    }
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert an active user with [`TEST_PASSWORD`]; the email derives from the staff id.
pub async fn create_user(pool: &PgPool, staff_id: &str, role: Role) -> User {
    let input = CreateUser {
        first_name: "Test".to_string(),
        last_name: staff_id.to_string(),
        staff_id: staff_id.to_string(),
        email: format!("{}@becs.test", staff_id.to_lowercase()),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        role,
        department: None,
        position: None,
        phone_number: None,
    };
    UserRepo::create(pool, &input).await.unwrap()
}

/// A valid access token for `user`, signed with the test secret.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, user.role, &test_jwt_config()).unwrap()
}

pub async fn create_project(
    pool: &PgPool,
    code: &str,
    project_type: ProjectType,
    consortium: Option<Consortium>,
) -> Project {
    let input = CreateProject {
        code: code.to_string(),
        name: format!("Project {code}"),
        project_type,
        consortium,
        status: ProjectStatus::Active,
        client_name: None,
        description: None,
        start_date: None,
        end_date: None,
    };
    ProjectRepo::create(pool, &input).await.unwrap()
}

pub async fn create_task(
    pool: &PgPool,
    project_id: DbId,
    assignee: Option<&User>,
    reviewer: Option<&User>,
    created_by: &User,
    due: Option<Date>,
) -> Task {
    let input = CreateTask {
        project_id,
        title: "Site survey report".to_string(),
        description: None,
        priority: TaskPriority::Medium,
        assignee_id: assignee.map(|u| u.id),
        reviewer_id: reviewer.map(|u| u.id),
        target_completion_date: due,
        is_weekly_deliverable: false,
        created_by: created_by.id,
    };
    TaskRepo::create(pool, &input).await.unwrap()
}
