//! Fixtures shared by unit and HTTP tests.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use crate::domains::user::services::{
    AuthService, JwtConfig, JwtService, PasswordConfig, PasswordService, UserService,
};
use crate::routes::build_router;
use crate::shared::models::User;
use crate::shared::state::{AppState, Stores};
use crate::shared::store::{MemoryStore, RecordStore};
use crate::system::config::{AppConfig, MIN_BCRYPT_COST};

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "test-secret".to_string();
    config.auth.bcrypt_cost = MIN_BCRYPT_COST;
    config.environment = "test".to_string();
    config
}

pub fn user_service() -> UserService {
    let store: Arc<dyn RecordStore<User>> = Arc::new(MemoryStore::<User>::new());
    let passwords = PasswordService::new(PasswordConfig {
        bcrypt_cost: MIN_BCRYPT_COST,
    })
    .unwrap();
    UserService::new(store, passwords)
}

pub fn auth_service() -> (AuthService, Arc<JwtService>) {
    let tokens = Arc::new(JwtService::new(JwtConfig::from(&test_config().auth)));
    (AuthService::new(user_service(), tokens.clone()), tokens)
}

pub fn test_state() -> Arc<AppState> {
    Arc::new(AppState::new(test_config(), Stores::in_memory(), None).unwrap())
}

pub fn test_app() -> (Router, Arc<AppState>) {
    let state = test_state();
    (build_router(state.clone()), state)
}

/// Send one request through the router and decode the JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Register a user over HTTP and return `(user id, access token, refresh token)`.
pub async fn register(app: &Router, email: &str) -> (String, String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(serde_json::json!({
            "email": email,
            "password": "password123",
            "name": "Test User",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let data = &body["data"];
    (
        data["user"]["id"].as_str().unwrap().to_string(),
        data["accessToken"].as_str().unwrap().to_string(),
        data["refreshToken"].as_str().unwrap().to_string(),
    )
}
