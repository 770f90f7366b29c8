use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;

use crate::shared::store::{IndexSpec, Record};
use crate::shared::utils::date_util::{DateTime, DateUtil};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn has_permission(&self, required: Role) -> bool {
        match (self, required) {
            (Role::Admin, _) => true,
            (Role::User, Role::User) => true,
            (Role::User, Role::Admin) => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Stored user document. Never serialized to clients; see `PublicUser`.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    pub name: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub followers_count: u32,
    #[serde(default)]
    pub following_count: u32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    pub fn new(email: &str, password_hash: String, name: String) -> Self {
        let now = DateUtil::now();
        Self {
            id: Uuid::new_v4().to_string(),
            email: Self::normalize_email(email),
            password_hash,
            name,
            bio: None,
            avatar: None,
            role: Role::default(),
            followers_count: 0,
            following_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn normalize_email(email: &str) -> String {
        email.to_lowercase()
    }

    /// Apply a partial profile update. Email and password are not touched here.
    pub fn apply_profile(
        &mut self,
        name: Option<String>,
        bio: Option<String>,
        avatar: Option<String>,
    ) {
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(bio) = bio {
            self.bio = Some(bio);
        }
        if let Some(avatar) = avatar {
            self.avatar = Some(avatar);
        }
        self.updated_at = DateUtil::now();
    }
}

impl Record for User {
    const COLLECTION: &'static str = "users";
    const INDEXES: &'static [IndexSpec] =
        &[IndexSpec::unique("email"), IndexSpec::descending("createdAt")];

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime {
        self.created_at
    }
}
