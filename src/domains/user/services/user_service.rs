use std::sync::Arc;

use tracing::info;

use crate::domains::user::dto::{PublicUser, UpdateUserRequest};
use crate::domains::user::services::PasswordService;
use crate::shared::error::{AppError, AppResult};
use crate::shared::models::User;
use crate::shared::store::{Filter, RecordStore, RepositoryError};

/// Owns user records: registration, lookups, password checks and profile
/// updates.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn RecordStore<User>>,
    passwords: PasswordService,
}

impl UserService {
    pub fn new(store: Arc<dyn RecordStore<User>>, passwords: PasswordService) -> Self {
        Self { store, passwords }
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> AppResult<User> {
        if self.find_by_email(email).await?.is_some() {
            return Err(email_taken());
        }

        let password_hash = self
            .passwords
            .hash_password(password)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let user = User::new(email, password_hash, name.to_string());

        // The store's unique index settles registrations racing past the check above
        self.store.insert(&user).await.map_err(|e| match e {
            RepositoryError::Duplicate(_) => email_taken(),
            other => other.into(),
        })?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let filter = Filter::new().eq("email", User::normalize_email(email));
        Ok(self.store.find_one(&filter).await?)
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<User> {
        self.store
            .find_one(&Filter::by_id(id))
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    pub async fn validate_password(&self, user: &User, password: &str) -> bool {
        self.passwords
            .verify_password(password, &user.password_hash)
            .await
    }

    /// Spend the same effort as [`Self::validate_password`] for a user that
    /// does not exist.
    pub async fn reject_unknown_user(&self, password: &str) -> bool {
        self.passwords.verify_against_dummy(password).await
    }

    pub async fn update(&self, id: &str, update: UpdateUserRequest) -> AppResult<User> {
        let mut user = self.find_by_id(id).await?;
        user.apply_profile(update.name, update.bio, update.avatar);

        if !self.store.replace(&user).await? {
            return Err(AppError::not_found("User"));
        }

        info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    pub fn to_public_view(user: &User) -> PublicUser {
        PublicUser::from(user)
    }
}

fn email_taken() -> AppError {
    AppError::Conflict("Email already registered".to_string())
}
