use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;

use crate::shared::error::AppError;
use crate::shared::models::User;
use crate::shared::state::AppState;

/// The authenticated user, resolved by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(unauthorized)
    }
}

// Extract token from Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .filter(|token| !token.is_empty())
}

/// Verifies the bearer access token and resolves its subject before the
/// request reaches a handler.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or_else(unauthorized)?;

    let claims = state.tokens.verify_access_token(&token).map_err(|e| {
        debug!(reason = %e, "access token rejected");
        unauthorized()
    })?;

    // A token for a user that no longer resolves is as good as no token
    let user = state.users.find_by_id(&claims.sub).await.map_err(|e| match e {
        AppError::NotFound(_) => unauthorized(),
        other => other,
    })?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

fn unauthorized() -> AppError {
    AppError::Unauthorized("Unauthorized".to_string())
}
