use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    middleware,
    response::Json,
    routing::{get, patch, post},
};
use serde::Serialize;
use serde_with::skip_serializing_none;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domains::{
    events::Event,
    notes::Note,
    orders::Order,
    posts::Post,
    products::Product,
    resource::{Resource, handlers as resource},
    tasks::{self, Task},
    user::handlers::{
        auth_middleware, get_me, get_user, login, logout, refresh_token, register, update_me,
    },
};
use crate::shared::{error::AppError, response::ApiResponse, state::AppState};

pub fn build_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token));

    let protected = Router::new()
        .route("/auth/logout", post(logout))
        .route("/users/me", get(get_me).patch(update_me))
        .route("/users/{id}", get(get_user))
        .merge(resource_routes::<Task>())
        .route("/tasks/{id}/status", patch(tasks::update_status))
        .merge(resource_routes::<Note>())
        .merge(resource_routes::<Post>())
        .merge(resource_routes::<Event>())
        .merge(resource_routes::<Order>())
        .merge(resource_routes::<Product>())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .fallback(route_not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `/{collection}` and `/{collection}/{id}` for one resource.
fn resource_routes<T: Resource>() -> Router<Arc<AppState>> {
    let base = format!("/{}", T::COLLECTION);
    Router::new()
        .route(
            &base,
            post(resource::create::<T>).get(resource::list::<T>),
        )
        .route(
            &format!("{}/{{id}}", base),
            get(resource::find_one::<T>)
                .patch(resource::update::<T>)
                .delete(resource::remove::<T>),
        )
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    environment: String,
    storage: &'static str,
    database: Option<DatabaseHealth>,
}

#[derive(Debug, Serialize)]
struct DatabaseHealth {
    name: String,
    healthy: bool,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthStatus>> {
    let database = match &state.database {
        Some(db) => Some(DatabaseHealth {
            name: db.name().to_string(),
            healthy: db.health_check().await,
        }),
        None => None,
    };
    let healthy = database.as_ref().is_none_or(|db| db.healthy);

    Json(ApiResponse::success(HealthStatus {
        status: if healthy { "healthy" } else { "unhealthy" },
        environment: state.config.environment.clone(),
        storage: state.storage(),
        database,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::shared::models::Role;
    use crate::shared::store::{Filter, RecordStore};
    use crate::test_support::{register, send, test_app};

    #[tokio::test]
    async fn test_health_reports_memory_storage() {
        let (app, _) = test_app();
        let (status, body) = send(&app, "GET", "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["storage"], "memory");
        assert!(body["data"].get("database").is_none());
    }

    #[tokio::test]
    async fn test_register_returns_created_user_and_tokens() {
        let (app, _) = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/auth/register",
            None,
            Some(json!({"email": "New@Example.com", "password": "password123", "name": "New User"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "User registered successfully");
        assert_eq!(body["data"]["user"]["email"], "new@example.com");
        assert!(body["data"]["user"].get("password").is_none());
        assert!(body["data"]["accessToken"].is_string());
        assert!(body["data"]["refreshToken"].is_string());
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let (app, _) = test_app();
        register(&app, "taken@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/auth/register",
            None,
            Some(json!({"email": "TAKEN@example.com", "password": "password123", "name": "Other"})),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Email already registered");
    }

    #[tokio::test]
    async fn test_invalid_bodies_are_bad_requests() {
        let (app, _) = test_app();

        let (status, body) = send(
            &app,
            "POST",
            "/auth/register",
            None,
            Some(json!({"email": "not-an-email", "password": "short", "name": "A"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("email must be an email"));
        assert!(message.contains("password must be longer than or equal to 8 characters"));

        let (status, body) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "a@b.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_login_success_and_uniform_failure() {
        let (app, _) = test_app();
        register(&app, "login@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "login@example.com", "password": "password123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");

        let (wrong_status, wrong_body) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "login@example.com", "password": "wrong-password"})),
        )
        .await;
        let (unknown_status, unknown_body) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "nobody@example.com", "password": "password123"})),
        )
        .await;

        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_body["message"], "Invalid credentials");
        assert_eq!(wrong_body["message"], unknown_body["message"]);
    }

    #[tokio::test]
    async fn test_refresh_flow() {
        let (app, _) = test_app();
        let (user_id, access, refresh) = register(&app, "refresh@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/auth/refresh",
            None,
            Some(json!({"refreshToken": refresh})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user"]["id"], user_id.as_str());
        let new_access = body["data"]["accessToken"].as_str().unwrap();
        assert_ne!(new_access, access);

        let (status, _) = send(&app, "GET", "/users/me", Some(new_access), None).await;
        assert_eq!(status, StatusCode::OK);

        // An access token is not a refresh token
        let (status, body) = send(
            &app,
            "POST",
            "/auth/refresh",
            None,
            Some(json!({"refreshToken": access})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid refresh token");
    }

    #[tokio::test]
    async fn test_tampered_refresh_token_is_rejected() {
        let (app, _) = test_app();
        let (_, _, refresh) = register(&app, "tamper@example.com").await;

        // Flip the first signature character
        let mut tampered = refresh.into_bytes();
        let at = tampered.iter().rposition(|b| *b == b'.').unwrap() + 1;
        tampered[at] = if tampered[at] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/auth/refresh",
            None,
            Some(json!({"refreshToken": tampered})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid refresh token");
    }

    #[tokio::test]
    async fn test_protected_routes_require_access_token() {
        let (app, _) = test_app();
        let (_, _, refresh) = register(&app, "guard@example.com").await;

        for token in [None, Some("garbage"), Some(refresh.as_str())] {
            let (status, body) = send(&app, "GET", "/users/me", token, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["success"], false);
        }

        let (status, _) = send(&app, "GET", "/tasks", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_read_and_update() {
        let (app, _) = test_app();
        let (user_id, access, _) = register(&app, "me@example.com").await;

        let (status, body) = send(&app, "GET", "/users/me", Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "me@example.com");
        assert_eq!(body["data"]["followersCount"], 0);

        let (status, body) = send(
            &app,
            "PATCH",
            "/users/me",
            Some(&access),
            Some(json!({"bio": "Hello there", "email": "hijack@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Profile updated successfully");
        assert_eq!(body["data"]["bio"], "Hello there");
        assert_eq!(body["data"]["email"], "me@example.com");

        let uri = format!("/users/{}", user_id);
        let (status, body) = send(&app, "GET", &uri, Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["bio"], "Hello there");

        let (status, body) = send(&app, "GET", "/users/missing", Some(&access), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn test_logout_confirms() {
        let (app, _) = test_app();
        let (_, access, _) = register(&app, "bye@example.com").await;

        let (status, body) = send(&app, "POST", "/auth/logout", Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logged out successfully");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_task_lifecycle() {
        let (app, _) = test_app();
        let (user_id, access, _) = register(&app, "tasks@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/tasks",
            Some(&access),
            Some(json!({"title": "Write report", "priority": "high"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Task created successfully");
        assert_eq!(body["data"]["userId"], user_id.as_str());
        assert_eq!(body["data"]["status"], "pending");
        let id = body["data"]["_id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, "GET", "/tasks?page=0&size=5", Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalElements"], 1);
        assert_eq!(body["data"]["size"], 5);
        assert_eq!(body["data"]["first"], true);
        assert_eq!(body["data"]["last"], true);

        let status_uri = format!("/tasks/{}/status?status=in_progress", id);
        let (status, body) = send(&app, "PATCH", &status_uri, Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "in_progress");

        let bad_status_uri = format!("/tasks/{}/status?status=sleeping", id);
        let (status, _) = send(&app, "PATCH", &bad_status_uri, Some(&access), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = format!("/tasks/{}", id);
        let (status, body) = send(
            &app,
            "PATCH",
            &uri,
            Some(&access),
            Some(json!({"title": "Write final report"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Write final report");
        assert_eq!(body["data"]["priority"], "high");

        let (status, body) = send(&app, "DELETE", &uri, Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Task deleted successfully");

        let (status, body) = send(&app, "GET", &uri, Some(&access), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Task not found");
    }

    #[tokio::test]
    async fn test_records_are_invisible_to_other_users() {
        let (app, _) = test_app();
        let (_, alice, _) = register(&app, "alice@example.com").await;
        let (_, bob, _) = register(&app, "bob@example.com").await;

        let (_, body) = send(
            &app,
            "POST",
            "/notes",
            Some(&alice),
            Some(json!({"title": "Private", "tags": ["me"]})),
        )
        .await;
        let uri = format!("/notes/{}", body["data"]["_id"].as_str().unwrap());

        for method in ["GET", "DELETE"] {
            let (status, _) = send(&app, method, &uri, Some(&bob), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
        let (status, _) = send(
            &app,
            "PATCH",
            &uri,
            Some(&bob),
            Some(json!({"title": "Mine now"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(&app, "GET", "/notes", Some(&bob), None).await;
        assert_eq!(body["data"]["totalElements"], 0);

        let (status, body) = send(&app, "GET", &uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Private");
    }

    #[tokio::test]
    async fn test_product_writes_require_admin() {
        let (app, state) = test_app();
        let (_, shopper, _) = register(&app, "shopper@example.com").await;
        let (admin_id, admin, _) = register(&app, "admin@example.com").await;

        let mut admin_user = state
            .stores
            .users
            .find_one(&Filter::by_id(&admin_id))
            .await
            .unwrap()
            .unwrap();
        admin_user.role = Role::Admin;
        state.stores.users.replace(&admin_user).await.unwrap();

        let product = json!({"name": "Desk lamp", "price": 19.99, "category": "home"});

        let (status, body) =
            send(&app, "POST", "/products", Some(&shopper), Some(product.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);

        let (status, body) = send(&app, "POST", "/products", Some(&admin), Some(product)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["data"].get("userId").is_none());

        let (status, body) =
            send(&app, "GET", "/products?category=home", Some(&shopper), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["content"][0]["name"], "Desk lamp");
    }

    #[tokio::test]
    async fn test_order_total_and_event_dates() {
        let (app, _) = test_app();
        let (_, access, _) = register(&app, "buyer@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/orders",
            Some(&access),
            Some(json!({"items": [
                {"productId": "p1", "quantity": 2, "price": 10.0},
                {"productId": "p2", "quantity": 1, "price": 5.5}
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["totalAmount"], 25.5);

        let (status, _) = send(
            &app,
            "POST",
            "/orders",
            Some(&access),
            Some(json!({"items": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            "POST",
            "/events",
            Some(&access),
            Some(json!({
                "title": "Launch",
                "startDate": "2030-01-02T10:00:00Z",
                "endDate": "2030-01-01T10:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "endDate must not precede startDate");
    }

    #[tokio::test]
    async fn test_unknown_route_uses_envelope() {
        let (app, _) = test_app();
        let (status, body): (StatusCode, Value) = send(&app, "GET", "/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Route not found");
    }

    #[tokio::test]
    async fn test_huge_page_number_returns_empty_last_page() {
        let (app, _) = test_app();
        let (_, access, _) = register(&app, "pager@example.com").await;

        let (status, body) = send(
            &app,
            "GET",
            "/tasks?page=18446744073709551615",
            Some(&access),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["content"], json!([]));
        assert_eq!(body["data"]["last"], true);
    }
}
