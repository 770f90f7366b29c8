use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;

use crate::domains::resource::{ListQuery, OWNER_FIELD, Resource};
use crate::shared::error::{AppError, AppResult};
use crate::shared::state::Stores;
use crate::shared::store::{Filter, IndexSpec, Record, RecordStore};
use crate::shared::utils::date_util::DateTime;
use crate::shared::validation::{FieldRules, FieldValue, Rule, Validate};

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
}

impl Location {
    fn check(&self, errors: &mut Vec<String>) {
        if !(-90.0..=90.0).contains(&self.lat) {
            errors.push("location.lat must be between -90 and 90".to_string());
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            errors.push("location.lng must be between -180 and 180".to_string());
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<Location>,
    pub start_date: DateTime,
    pub end_date: DateTime,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub interested_users: Vec<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Record for Event {
    const COLLECTION: &'static str = "events";
    const INDEXES: &'static [IndexSpec] = &[
        IndexSpec::ascending(OWNER_FIELD),
        IndexSpec::ascending("startDate"),
        IndexSpec::descending("createdAt"),
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime {
        self.created_at
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<Location>,
    pub start_date: DateTime,
    pub end_date: DateTime,
}

impl Validate for CreateEventRequest {
    const RULES: &'static [FieldRules] = &[
        FieldRules {
            field: "title",
            rules: &[Rule::Required, Rule::MaxLength(200)],
        },
        FieldRules {
            field: "description",
            rules: &[Rule::MaxLength(2000)],
        },
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "title" => (&self.title).into(),
            "description" => self.description.as_ref().into(),
            _ => FieldValue::Absent,
        }
    }

    fn check(&self, errors: &mut Vec<String>) {
        if let Some(location) = &self.location {
            location.check(errors);
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<Location>,
    pub start_date: Option<DateTime>,
    pub end_date: Option<DateTime>,
}

impl Validate for UpdateEventRequest {
    const RULES: &'static [FieldRules] = &[
        FieldRules {
            field: "title",
            rules: &[Rule::MinLength(1), Rule::MaxLength(200)],
        },
        FieldRules {
            field: "description",
            rules: &[Rule::MaxLength(2000)],
        },
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "title" => self.title.as_ref().into(),
            "description" => self.description.as_ref().into(),
            _ => FieldValue::Absent,
        }
    }

    fn check(&self, errors: &mut Vec<String>) {
        if let Some(location) = &self.location {
            location.check(errors);
        }
    }
}

impl Resource for Event {
    const NAME: &'static str = "Event";

    type Create = CreateEventRequest;
    type Update = UpdateEventRequest;

    fn store(stores: &Stores) -> Arc<dyn RecordStore<Self>> {
        stores.events.clone()
    }

    fn create(owner_id: &str, input: CreateEventRequest, now: DateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            title: input.title,
            description: input.description,
            location: input.location,
            start_date: input.start_date,
            end_date: input.end_date,
            attendees: Vec::new(),
            interested_users: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: UpdateEventRequest, now: DateTime) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(description) = input.description {
            self.description = Some(description);
        }
        if let Some(location) = input.location {
            self.location = Some(location);
        }
        if let Some(start_date) = input.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = input.end_date {
            self.end_date = end_date;
        }
        self.updated_at = now;
    }

    // Either date may move on its own; the pair is checked after merging
    fn verify(&self) -> AppResult<()> {
        if self.end_date < self.start_date {
            return Err(AppError::validation("endDate must not precede startDate"));
        }
        Ok(())
    }

    fn filters(query: &ListQuery, filter: Filter) -> Filter {
        match query.search_term() {
            Some(term) => filter.contains("title", term),
            None => filter,
        }
    }
}
