use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::resource::{ListQuery, OWNER_FIELD, Resource};
use crate::shared::state::Stores;
use crate::shared::store::{Filter, IndexSpec, Record, RecordStore};
use crate::shared::utils::date_util::DateTime;
use crate::shared::validation::{FieldRules, FieldValue, Rule, Validate};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Record for Note {
    const COLLECTION: &'static str = "notes";
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
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Validate for CreateNoteRequest {
    const RULES: &'static [FieldRules] = &[FieldRules {
        field: "title",
        rules: &[Rule::Required, Rule::MaxLength(200)],
    }];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "title" => (&self.title).into(),
            _ => FieldValue::Absent,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_pinned: Option<bool>,
    pub is_favorite: Option<bool>,
}

impl Validate for UpdateNoteRequest {
    const RULES: &'static [FieldRules] = &[FieldRules {
        field: "title",
        rules: &[Rule::MinLength(1), Rule::MaxLength(200)],
    }];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "title" => self.title.as_ref().into(),
            _ => FieldValue::Absent,
        }
    }
}

impl Resource for Note {
    const NAME: &'static str = "Note";

    type Create = CreateNoteRequest;
    type Update = UpdateNoteRequest;

    fn store(stores: &Stores) -> Arc<dyn RecordStore<Self>> {
        stores.notes.clone()
    }

    fn create(owner_id: &str, input: CreateNoteRequest, now: DateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            title: input.title,
            content: input.content,
            tags: input.tags,
            is_pinned: input.is_pinned,
            is_favorite: input.is_favorite,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: UpdateNoteRequest, now: DateTime) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(content) = input.content {
            self.content = content;
        }
        if let Some(tags) = input.tags {
            self.tags = tags;
        }
        if let Some(is_pinned) = input.is_pinned {
            self.is_pinned = is_pinned;
        }
        if let Some(is_favorite) = input.is_favorite {
            self.is_favorite = is_favorite;
        }
        self.updated_at = now;
    }

    fn filters(query: &ListQuery, filter: Filter) -> Filter {
        match query.search_term() {
            Some(term) => filter.contains("title", term),
            None => filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::utils::date_util::DateUtil;

    #[test]
    fn test_create_request_defaults() {
        let request: CreateNoteRequest = serde_json::from_str(r#"{"title":"Ideas"}"#).unwrap();
        let note = Note::create("u1", request, DateUtil::now());

        assert!(note.content.is_empty());
        assert!(note.tags.is_empty());
        assert!(!note.is_pinned);
        assert!(!note.is_favorite);
    }

    #[test]
    fn test_apply_toggles_flags() {
        let request: CreateNoteRequest = serde_json::from_str(r#"{"title":"Ideas"}"#).unwrap();
        let mut note = Note::create("u1", request, DateUtil::now());

        note.apply(
            UpdateNoteRequest {
                is_pinned: Some(true),
                tags: Some(vec!["work".into()]),
                ..UpdateNoteRequest::default()
            },
            DateUtil::now(),
        );

        assert!(note.is_pinned);
        assert_eq!(note.tags, vec!["work".to_string()]);
        assert_eq!(note.title, "Ideas");

        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["isPinned"], true);
    }

    #[test]
    fn test_search_targets_title() {
        let query = ListQuery {
            search: Some(" idea ".into()),
            ..ListQuery::default()
        };
        let filter = Note::filters(&query, Filter::new());
        assert_eq!(filter, Filter::new().contains("title", "idea"));
    }
}
