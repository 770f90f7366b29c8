//! Table-driven request validation.
//!
//! Request DTOs stay plain structs. Each one declares a static table mapping
//! field names to rules and exposes its field values by name; [`validate`]
//! walks the table and collects every violation.

use std::sync::LazyLock;

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::shared::error::AppError;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .unwrap_or_else(|e| panic!("email regex must compile: {e}"))
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// Present and not blank; a list must be non-empty.
    Required,
    Email,
    MinLength(usize),
    MaxLength(usize),
    Min(f64),
}

pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

/// Value of a field as seen by the validator.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Absent,
    Text(&'a str),
    Number(f64),
    List(usize),
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value)
    }
}

impl<'a, T> From<Option<T>> for FieldValue<'a>
where
    T: Into<FieldValue<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

impl From<f64> for FieldValue<'_> {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for FieldValue<'_> {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl<T> From<&Vec<T>> for FieldValue<'_> {
    fn from(value: &Vec<T>) -> Self {
        Self::List(value.len())
    }
}

pub trait Validate {
    const RULES: &'static [FieldRules];

    fn field(&self, name: &str) -> FieldValue<'_>;

    /// Checks that do not fit a per-field rule, e.g. cross-field constraints.
    fn check(&self, _errors: &mut Vec<String>) {}
}

pub fn validate<T: Validate>(value: &T) -> Result<(), AppError> {
    let mut errors = Vec::new();

    for entry in T::RULES {
        let field_value = value.field(entry.field);
        for rule in entry.rules {
            if let Some(message) = apply_rule(entry.field, *rule, field_value) {
                errors.push(message);
            }
        }
    }
    value.check(&mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn apply_rule(field: &str, rule: Rule, value: FieldValue<'_>) -> Option<String> {
    match (rule, value) {
        (Rule::Required, FieldValue::Absent) => Some(format!("{} is required", field)),
        (Rule::Required, FieldValue::Text(text)) if text.trim().is_empty() => {
            Some(format!("{} should not be empty", field))
        }
        (Rule::Required, FieldValue::List(0)) => Some(format!("{} should not be empty", field)),
        (Rule::Email, FieldValue::Text(text)) if !EMAIL_REGEX.is_match(text) => {
            Some(format!("{} must be an email", field))
        }
        (Rule::MinLength(min), FieldValue::Text(text)) if text.chars().count() < min => Some(
            format!("{} must be longer than or equal to {} characters", field, min),
        ),
        (Rule::MaxLength(max), FieldValue::Text(text)) if text.chars().count() > max => Some(
            format!("{} must be shorter than or equal to {} characters", field, max),
        ),
        (Rule::Min(min), FieldValue::Number(number)) if number < min => {
            Some(format!("{} must not be less than {}", field, min))
        }
        _ => None,
    }
}

/// JSON body extractor that reports malformed bodies and rule violations
/// through [`AppError`], so they reach the client in the usual envelope.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        validate(&value)?;
        Ok(Self(value))
    }
}
