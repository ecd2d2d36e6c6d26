//! End-to-end tests over the full router against a real database. They run
//! when TEST_DATABASE_URL points at a Postgres instance (migrations are
//! applied automatically) and skip quietly otherwise, so the unit suite
//! stays runnable anywhere.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use inkpress::app::build_app;
use inkpress::config::{AppConfig, JwtConfig};
use inkpress::state::AppState;

async fn test_state() -> Option<AppState> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return None;
    };
    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("run migrations");
    Some(AppState {
        db,
        config: Arc::new(AppConfig {
            database_url: url,
            jwt: JwtConfig {
                secret: "integration-secret".into(),
                ttl_minutes: 60,
            },
        }),
    })
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut req = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        req = req.header("authorization", format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(req).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

fn unique_email() -> String {
    format!("{}@example.com", Uuid::new_v4())
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> serde_json::Value {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(serde_json::json!({ "name": name, "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {email}: {body}");
    body["user"].clone()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login {email}: {body}");
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn duplicate_email_registration_conflicts_and_first_account_survives() {
    let Some(state) = test_state().await else { return };
    let app = build_app(state);

    let email = unique_email();
    let first = register(&app, "Ada", &email, "first-password").await;
    assert_eq!(first["role"], "user");

    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(serde_json::json!({ "name": "Imposter", "email": email, "password": "second-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User with this email already exists");

    // The first account is unchanged: its password still logs in and the
    // profile still carries the original name.
    let token = login(&app, &email, "first-password").await;
    let (status, profile) = send(&app, "GET", "/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "Ada");
    assert!(profile.get("password_hash").is_none());
}

#[tokio::test]
async fn missing_post_is_404_regardless_of_caller() {
    let Some(state) = test_state().await else { return };
    let app = build_app(state);

    let absent = Uuid::new_v4();
    let body = serde_json::json!({ "title": "x", "content": "y" });

    // No token at all: existence is checked first, so this is 404, not 401.
    let (status, _) = send(&app, "PUT", &format!("/posts/{absent}"), None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/posts/{absent}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Same answer for a fully authenticated caller.
    let email = unique_email();
    register(&app, "Ada", &email, "secret-pass").await;
    let token = login(&app, &email, "secret-pass").await;
    let (status, _) = send(&app, "PUT", &format!("/posts/{absent}"), Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/posts/{absent}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_email_collision_conflicts_and_leaves_caller_unchanged() {
    let Some(state) = test_state().await else { return };
    let app = build_app(state);

    let taken = unique_email();
    register(&app, "Ada", &taken, "ada-password").await;

    let mine = unique_email();
    register(&app, "Grace", &mine, "grace-password").await;
    let token = login(&app, &mine, "grace-password").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/profile",
        Some(&token),
        Some(serde_json::json!({ "email": taken })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email is already in use");

    let (_, profile) = send(&app, "GET", "/profile", Some(&token), None).await;
    assert_eq!(profile["email"], mine);
}

#[tokio::test]
async fn profile_update_trims_the_name() {
    let Some(state) = test_state().await else { return };
    let app = build_app(state);

    let email = unique_email();
    register(&app, "Ada", &email, "ada-password").await;
    let token = login(&app, &email, "ada-password").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/profile",
        Some(&token),
        Some(serde_json::json!({ "name": "  Ada Lovelace  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Ada Lovelace");
}

#[tokio::test]
async fn ownership_and_role_policies_govern_post_mutation() {
    let Some(state) = test_state().await else { return };
    let db = state.db.clone();
    let app = build_app(state);

    // A is a regular author, B gets promoted to admin, C is unrelated.
    let (a_email, b_email, c_email) = (unique_email(), unique_email(), unique_email());
    register(&app, "Author", &a_email, "author-pass").await;
    let b = register(&app, "Admin", &b_email, "admin-pass").await;
    register(&app, "Bystander", &c_email, "bystander-pass").await;

    let b_id: Uuid = b["id"].as_str().expect("id").parse().expect("uuid");
    sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
        .bind(b_id)
        .execute(&db)
        .await
        .expect("promote admin");

    let a_token = login(&app, &a_email, "author-pass").await;
    let b_token = login(&app, &b_email, "admin-pass").await;
    let c_token = login(&app, &c_email, "bystander-pass").await;

    let (status, created) = send(
        &app,
        "POST",
        "/posts",
        Some(&a_token),
        Some(serde_json::json!({ "title": "Hello", "content": "World" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let post_id = created["post"]["id"].as_str().expect("post id").to_string();
    assert_eq!(created["post"]["author"]["email"], a_email);

    let edit = serde_json::json!({ "title": "Edited" });

    // Unrelated account: forbidden.
    let (status, _) = send(&app, "PUT", &format!("/posts/{post_id}"), Some(&c_token), Some(edit.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The author: allowed.
    let (status, body) = send(&app, "PUT", &format!("/posts/{post_id}"), Some(&a_token), Some(edit.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["title"], "Edited");

    // Any admin: allowed, including delete.
    let (status, _) = send(&app, "PUT", &format!("/posts/{post_id}"), Some(&b_token), Some(edit)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &format!("/posts/{post_id}"), Some(&b_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &format!("/posts/{post_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
