use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::{
    domains::user::{
        dto::{PublicUser, UpdateUserRequest},
        handlers::CurrentUser,
        services::UserService,
    },
    shared::{
        error::AppResult, response::ApiResponse, state::AppState, validation::ValidJson,
    },
};

pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<ApiResponse<PublicUser>> {
    Json(ApiResponse::success(UserService::to_public_view(&user)))
}

pub async fn update_me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidJson(payload): ValidJson<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<PublicUser>>> {
    let updated = state.users.update(&user.id, payload).await?;
    Ok(Json(ApiResponse::with_message(
        UserService::to_public_view(&updated),
        "Profile updated successfully",
    )))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<PublicUser>>> {
    let user = state.users.find_by_id(&id).await?;
    Ok(Json(ApiResponse::success(UserService::to_public_view(&user))))
}
