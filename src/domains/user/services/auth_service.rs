use std::sync::Arc;

use tracing::{debug, info};

use crate::domains::user::dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::domains::user::services::{JwtService, UserService};
use crate::shared::error::{AppError, AppResult};
use crate::shared::models::User;

/// Register, login and refresh flows on top of the user and token services.
#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    tokens: Arc<JwtService>,
}

impl AuthService {
    pub fn new(users: UserService, tokens: Arc<JwtService>) -> Self {
        Self { users, tokens }
    }

    pub async fn register(&self, request: &RegisterRequest) -> AppResult<AuthResponse> {
        let user = self
            .users
            .register(&request.email, &request.password, &request.name)
            .await?;
        self.respond(&user)
    }

    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, request: &LoginRequest) -> AppResult<AuthResponse> {
        let Some(user) = self.users.find_by_email(&request.email).await? else {
            self.users.reject_unknown_user(&request.password).await;
            debug!("login rejected");
            return Err(AppError::invalid_credentials());
        };

        if !self.users.validate_password(&user, &request.password).await {
            debug!("login rejected");
            return Err(AppError::invalid_credentials());
        }

        info!(user_id = %user.id, "user logged in");
        self.respond(&user)
    }

    /// Every failure, whatever its cause, surfaces as "Invalid refresh token".
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.tokens.verify_refresh_token(refresh_token).map_err(|e| {
            debug!(reason = %e, "refresh token rejected");
            AppError::invalid_refresh_token()
        })?;

        let user = self.users.find_by_id(&claims.sub).await.map_err(|e| {
            debug!(reason = %e, "refresh subject rejected");
            AppError::invalid_refresh_token()
        })?;

        info!(user_id = %user.id, "token pair refreshed");
        self.respond(&user)
    }

    fn respond(&self, user: &User) -> AppResult<AuthResponse> {
        let tokens = self.tokens.issue_pair(&user.id, &user.email)?;
        Ok(AuthResponse::new(user, tokens))
    }
}
