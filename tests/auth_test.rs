mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tower::ServiceExt;
use uuid::Uuid;

use stockroom_api::auth::Claims;
use stockroom_api::entities::{user, Role};
use stockroom_api::errors::ServiceError;
use stockroom_api::{app_router, AppState};

#[tokio::test]
async fn duplicate_email_registers_nothing() {
    let state = common::test_state().await;

    state
        .services
        .users
        .register("First".to_string(), "dup@example.com".to_string(), "password1")
        .await
        .unwrap();

    let err = state
        .services
        .users
        .register("Second".to_string(), "dup@example.com".to_string(), "password2")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Duplicate(_)));

    let rows = user::Entity::find()
        .filter(user::Column::Email.eq("dup@example.com"))
        .all(&*state.db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "First");
}

#[tokio::test]
async fn email_is_normalized_before_storage_and_lookup() {
    let state = common::test_state().await;

    state
        .services
        .users
        .register(
            "Mixed".to_string(),
            "  MiXeD@Example.COM ".to_string(),
            "password1",
        )
        .await
        .unwrap();

    // Same address in a different casing is the same account.
    let err = state
        .services
        .users
        .register("Again".to_string(), "mixed@example.com".to_string(), "password1")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Duplicate(_)));

    let login = state
        .services
        .users
        .login("mixed@example.com", "password1")
        .await
        .unwrap();
    assert_eq!(login.name, "Mixed");
    assert_eq!(login.role, Role::Client);
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email_alike() {
    let state = common::test_state().await;

    state
        .services
        .users
        .register("User".to_string(), "login@example.com".to_string(), "correct-pass")
        .await
        .unwrap();

    let ok = state
        .services
        .users
        .login("login@example.com", "correct-pass")
        .await
        .unwrap();
    assert!(!ok.token.is_empty());

    let wrong_password = state
        .services
        .users
        .login("login@example.com", "wrong-pass")
        .await
        .unwrap_err();
    let unknown_email = state
        .services
        .users
        .login("nobody@example.com", "correct-pass")
        .await
        .unwrap_err();

    // Neither failure mode reveals whether the email exists.
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert!(matches!(wrong_password, ServiceError::Auth(_)));
}

#[tokio::test]
async fn bootstrap_email_becomes_administrator() {
    let state = common::test_state().await;

    state
        .services
        .users
        .register(
            "Admin".to_string(),
            common::BOOTSTRAP_ADMIN_EMAIL.to_string(),
            "admin-pass",
        )
        .await
        .unwrap();
    state
        .services
        .users
        .register("Client".to_string(), "client@example.com".to_string(), "client-pass")
        .await
        .unwrap();

    let admin = state
        .services
        .users
        .login(common::BOOTSTRAP_ADMIN_EMAIL, "admin-pass")
        .await
        .unwrap();
    let client = state
        .services
        .users
        .login("client@example.com", "client-pass")
        .await
        .unwrap();

    assert_eq!(admin.role, Role::Administrator);
    assert_eq!(client.role, Role::Client);
}

async fn login_token(state: &AppState, email: &str, password: &str) -> String {
    state
        .services
        .users
        .login(email, password)
        .await
        .unwrap()
        .token
}

fn get_with_token(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn dashboard_requires_a_token() {
    let state = common::test_state().await;
    let app = app_router(state);

    let response = app
        .oneshot(get_with_token("/api/v1/dashboard/me", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_with_unknown_role_is_rejected_outright() {
    let state = common::test_state().await;

    // A validly signed token claiming a role outside the known set.
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: Uuid::new_v4(),
        name: "Eve".to_string(),
        role: "superuser".to_string(),
        iat: now,
        exp: now + 3600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(common::TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let app = app_router(state);
    let response = app
        .oneshot(get_with_token("/api/v1/dashboard/me", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_dashboard_is_forbidden_for_clients() {
    let state = common::test_state().await;

    state
        .services
        .users
        .register("Client".to_string(), "plain@example.com".to_string(), "client-pass")
        .await
        .unwrap();
    let token = login_token(&state, "plain@example.com", "client-pass").await;

    let app = app_router(state);
    let response = app
        .oneshot(get_with_token("/api/v1/dashboard/admin", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_dashboard_accepts_an_administrator() {
    let state = common::test_state().await;

    state
        .services
        .users
        .register(
            "Admin".to_string(),
            common::BOOTSTRAP_ADMIN_EMAIL.to_string(),
            "admin-pass",
        )
        .await
        .unwrap();
    let token = login_token(&state, common::BOOTSTRAP_ADMIN_EMAIL, "admin-pass").await;

    let app = app_router(state);
    let response = app
        .oneshot(get_with_token("/api/v1/dashboard/admin", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["total_sales"], 0);
}
