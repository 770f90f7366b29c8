use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::shared::models::User;
use crate::shared::utils::date_util::DateTime;
use crate::shared::validation::{FieldRules, FieldValue, Rule, Validate};

// User registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Validate for RegisterRequest {
    const RULES: &'static [FieldRules] = &[
        FieldRules {
            field: "email",
            rules: &[Rule::Required, Rule::Email],
        },
        FieldRules {
            field: "password",
            rules: &[Rule::Required, Rule::MinLength(8), Rule::MaxLength(50)],
        },
        FieldRules {
            field: "name",
            rules: &[Rule::Required, Rule::MinLength(2), Rule::MaxLength(100)],
        },
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "email" => (&self.email).into(),
            "password" => (&self.password).into(),
            "name" => (&self.name).into(),
            _ => FieldValue::Absent,
        }
    }
}

// User login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    const RULES: &'static [FieldRules] = &[
        FieldRules {
            field: "email",
            rules: &[Rule::Required, Rule::Email],
        },
        FieldRules {
            field: "password",
            rules: &[Rule::Required],
        },
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "email" => (&self.email).into(),
            "password" => (&self.password).into(),
            _ => FieldValue::Absent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

impl Validate for RefreshTokenRequest {
    const RULES: &'static [FieldRules] = &[FieldRules {
        field: "refreshToken",
        rules: &[Rule::Required],
    }];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "refreshToken" => (&self.refresh_token).into(),
            _ => FieldValue::Absent,
        }
    }
}

// Profile update request; email and password are deliberately absent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl Validate for UpdateUserRequest {
    const RULES: &'static [FieldRules] = &[
        FieldRules {
            field: "name",
            rules: &[Rule::MinLength(2), Rule::MaxLength(100)],
        },
        FieldRules {
            field: "bio",
            rules: &[Rule::MaxLength(500)],
        },
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "name" => self.name.as_deref().into(),
            "bio" => self.bio.as_deref().into(),
            _ => FieldValue::Absent,
        }
    }
}

/// External-safe view of a user.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub followers_count: u32,
    pub following_count: u32,
    pub created_at: DateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            bio: user.bio.clone(),
            avatar: user.avatar.clone(),
            followers_count: user.followers_count,
            following_count: user.following_count,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

// Authentication response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
}

impl AuthResponse {
    pub fn new(user: &User, tokens: TokenPair) -> Self {
        Self {
            user: user.into(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,    // User ID
    pub email: String,
    pub iat: i64,       // Issued at (timestamp)
    pub exp: i64,       // Expiration time (timestamp)
    pub jti: String,    // Unique token id
    pub typ: TokenKind,
}
