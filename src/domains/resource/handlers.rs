use std::sync::Arc;

use axum::{
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::Json,
};

use crate::{
    domains::{
        resource::{ListQuery, Resource, ResourceService},
        user::handlers::CurrentUser,
    },
    shared::{
        error::{AppError, AppResult},
        response::{ApiResponse, PageResponse},
        state::AppState,
        validation::ValidJson,
    },
};

pub async fn create<T: Resource>(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidJson(payload): ValidJson<T::Create>,
) -> AppResult<(StatusCode, Json<ApiResponse<T>>)> {
    let record = ResourceService::<T>::from_stores(&state.stores)
        .create(&user, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            record,
            format!("{} created successfully", T::NAME),
        )),
    ))
}

pub async fn list<T: Resource>(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<PageResponse<T>>>> {
    let Query(query) = query.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    let page = ResourceService::<T>::from_stores(&state.stores)
        .find_all(&user, &query)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn find_one<T: Resource>(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<T>>> {
    let record = ResourceService::<T>::from_stores(&state.stores)
        .find_one(&user, &id)
        .await?;
    Ok(Json(ApiResponse::success(record)))
}

pub async fn update<T: Resource>(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<T::Update>,
) -> AppResult<Json<ApiResponse<T>>> {
    let record = ResourceService::<T>::from_stores(&state.stores)
        .update(&user, &id, payload)
        .await?;
    Ok(Json(ApiResponse::with_message(
        record,
        format!("{} updated successfully", T::NAME),
    )))
}

pub async fn remove<T: Resource>(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    ResourceService::<T>::from_stores(&state.stores)
        .remove(&user, &id)
        .await?;
    Ok(Json(ApiResponse::message(format!(
        "{} deleted successfully",
        T::NAME
    ))))
}
