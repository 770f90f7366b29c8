use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::info;

use crate::{
    domains::user::{
        dto::{AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest},
        handlers::CurrentUser,
    },
    shared::{
        error::AppResult, response::ApiResponse, state::AppState, validation::ValidJson,
    },
};

// Register a new user
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let response = state.auth.register(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            response,
            "User registered successfully",
        )),
    ))
}

// Login user
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let response = state.auth.login(&payload).await?;
    Ok(Json(ApiResponse::with_message(response, "Login successful")))
}

// Exchange a refresh token for a new pair
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<RefreshTokenRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let response = state.auth.refresh(&payload.refresh_token).await?;
    Ok(Json(ApiResponse::with_message(
        response,
        "Token refreshed successfully",
    )))
}

// Tokens are stateless; the client discards them
pub async fn logout(CurrentUser(user): CurrentUser) -> Json<ApiResponse<()>> {
    info!(user_id = %user.id, "user logged out");
    Json(ApiResponse::message("Logged out successfully"))
}
