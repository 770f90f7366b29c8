//! Personal to-do items.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State, rejection::QueryRejection},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;

use crate::domains::resource::{ListQuery, OWNER_FIELD, Resource, ResourceService};
use crate::domains::user::handlers::CurrentUser;
use crate::shared::error::{AppError, AppResult};
use crate::shared::response::ApiResponse;
use crate::shared::state::{AppState, Stores};
use crate::shared::store::{Filter, IndexSpec, Record, RecordStore};
use crate::shared::utils::date_util::DateTime;
use crate::shared::validation::{FieldRules, FieldValue, Rule, Validate};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Work,
    Personal,
    Shopping,
    Health,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    pub due_date: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Record for Task {
    const COLLECTION: &'static str = "tasks";
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
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<TaskCategory>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime>,
}

impl Validate for CreateTaskRequest {
    const RULES: &'static [FieldRules] = &[
        FieldRules {
            field: "title",
            rules: &[Rule::Required, Rule::MaxLength(200)],
        },
        FieldRules {
            field: "description",
            rules: &[Rule::MaxLength(1000)],
        },
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "title" => (&self.title).into(),
            "description" => self.description.as_ref().into(),
            _ => FieldValue::Absent,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<TaskCategory>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime>,
}

impl Validate for UpdateTaskRequest {
    const RULES: &'static [FieldRules] = &[
        FieldRules {
            field: "title",
            rules: &[Rule::MinLength(1), Rule::MaxLength(200)],
        },
        FieldRules {
            field: "description",
            rules: &[Rule::MaxLength(1000)],
        },
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "title" => self.title.as_ref().into(),
            "description" => self.description.as_ref().into(),
            _ => FieldValue::Absent,
        }
    }
}

impl Resource for Task {
    const NAME: &'static str = "Task";

    type Create = CreateTaskRequest;
    type Update = UpdateTaskRequest;

    fn store(stores: &Stores) -> Arc<dyn RecordStore<Self>> {
        stores.tasks.clone()
    }

    fn create(owner_id: &str, input: CreateTaskRequest, now: DateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            title: input.title,
            description: input.description,
            category: input.category.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            status: TaskStatus::default(),
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: UpdateTaskRequest, now: DateTime) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(description) = input.description {
            self.description = Some(description);
        }
        if let Some(category) = input.category {
            self.category = category;
        }
        if let Some(priority) = input.priority {
            self.priority = priority;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(due_date) = input.due_date {
            self.due_date = Some(due_date);
        }
        self.updated_at = now;
    }

    fn filters(query: &ListQuery, mut filter: Filter) -> Filter {
        if let Some(status) = &query.status {
            filter = filter.eq("status", status.as_str());
        }
        if let Some(category) = &query.category {
            filter = filter.eq("category", category.as_str());
        }
        if let Some(term) = query.search_term() {
            filter = filter.contains("title", term);
        }
        filter
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: TaskStatus,
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<Task>>> {
    let Query(StatusQuery { status }) =
        query.map_err(|rejection| AppError::validation(rejection.body_text()))?;

    let task = ResourceService::<Task>::from_stores(&state.stores)
        .modify(&user, &id, |task, now| {
            task.status = status;
            task.updated_at = now;
        })
        .await?;
    Ok(Json(ApiResponse::with_message(task, "Task status updated")))
}
