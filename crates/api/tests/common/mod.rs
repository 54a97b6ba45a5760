#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use eduhub_api::auth::jwt::generate_access_token;
use eduhub_api::auth::password::hash_password;
use eduhub_api::config::{JwtConfig, ServerConfig};
use eduhub_api::router::build_app_router;
use eduhub_api::state::AppState;
use eduhub_core::types::DbId;
use eduhub_db::models::lesson::{CreateLesson, Lesson};
use eduhub_db::models::user::{CreateUser, User};
use eduhub_db::repositories::{LessonRepo, UserRepo};

pub const TEST_PASSWORD: &str = "learn-rust-42";

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 1,
        },
    }
}

/// Build the full application router, middleware included, on `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and mint an access token for it.
pub async fn create_user_with_token(pool: &PgPool, email: &str, role: &str) -> (User, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap();
    let token = generate_access_token(user.id, &user.role, &test_config().jwt).unwrap();
    (user, token)
}

/// Course body accepted by `POST /api/courses`.
pub fn course_body(title: &str, category: &str, level: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "description": format!("{title}, from first principles"),
        "category": category,
        "level": level,
        "price": 29.99,
        "duration_hours": 2,
        "duration_minutes": 15,
    })
}

/// Create a course through the API and return its id.
pub async fn create_course_via_api(app: Router, token: &str, title: &str) -> DbId {
    let response = post_json_auth(
        app,
        "/api/courses",
        course_body(title, "Programming", "Beginner"),
        token,
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Insert `count` lessons with sort orders `1..=count`.
pub async fn create_lessons(
    pool: &PgPool,
    instructor_id: DbId,
    course_id: DbId,
    count: i32,
) -> Vec<Lesson> {
    let mut lessons = Vec::new();
    for order in 1..=count {
        let lesson = LessonRepo::create(
            pool,
            instructor_id,
            &CreateLesson {
                course_id,
                title: format!("Lesson {order}"),
                description: None,
                sort_order: order,
                duration_mins: 12,
                video_url: format!("https://videos.example.com/{course_id}/{order}.mp4"),
                resources: vec![],
                quiz: vec![],
                is_preview: None,
                is_published: Some(true),
            },
        )
        .await
        .unwrap();
        lessons.push(lesson);
    }
    lessons
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

/// POST a raw, possibly malformed, JSON body.
pub async fn post_raw_auth(
    app: Router,
    uri: &str,
    raw: &'static str,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(raw))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST without a body, e.g. `/courses/{id}/enroll`.
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(token)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), Some(token)).await
}

pub async fn put_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, None, Some(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, Some(token)).await
}
