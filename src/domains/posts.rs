use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::resource::{ListQuery, OWNER_FIELD, Resource};
use crate::shared::state::Stores;
use crate::shared::store::{Filter, IndexSpec, Record, RecordStore};
use crate::shared::utils::date_util::DateTime;
use crate::shared::validation::{FieldRules, FieldValue, Rule, Validate};

/// Social feed entry. `likes` holds the ids of users who liked it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub comments_count: u32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Record for Post {
    const COLLECTION: &'static str = "posts";
    const INDEXES: &'static [IndexSpec] = &[
        IndexSpec::ascending(OWNER_FIELD),
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
pub struct CreatePostRequest {
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Validate for CreatePostRequest {
    const RULES: &'static [FieldRules] = &[FieldRules {
        field: "content",
        rules: &[Rule::Required, Rule::MaxLength(2000)],
    }];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "content" => (&self.content).into(),
            _ => FieldValue::Absent,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub content: Option<String>,
    pub images: Option<Vec<String>>,
}

impl Validate for UpdatePostRequest {
    const RULES: &'static [FieldRules] = &[FieldRules {
        field: "content",
        rules: &[Rule::MinLength(1), Rule::MaxLength(2000)],
    }];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "content" => self.content.as_ref().into(),
            _ => FieldValue::Absent,
        }
    }
}

impl Resource for Post {
    const NAME: &'static str = "Post";

    type Create = CreatePostRequest;
    type Update = UpdatePostRequest;

    fn store(stores: &Stores) -> Arc<dyn RecordStore<Self>> {
        stores.posts.clone()
    }

    fn create(owner_id: &str, input: CreatePostRequest, now: DateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            content: input.content,
            images: input.images,
            likes: Vec::new(),
            comments_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    // Likes and comment counts are not client-editable
    fn apply(&mut self, input: UpdatePostRequest, now: DateTime) {
        if let Some(content) = input.content {
            self.content = content;
        }
        if let Some(images) = input.images {
            self.images = images;
        }
        self.updated_at = now;
    }

    fn filters(query: &ListQuery, filter: Filter) -> Filter {
        match query.search_term() {
            Some(term) => filter.contains("content", term),
            None => filter,
        }
    }
}
