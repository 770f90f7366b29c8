//! Generic CRUD over feature records (tasks, notes, posts, ...).
//!
//! A feature implements [`Resource`] for its record type; the service and
//! handlers in this module do the rest. Owned resources are scoped to the
//! requesting user: another user's record simply does not exist.

pub mod handlers;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, de::DeserializeOwned};
use tracing::info;

use crate::shared::error::{AppError, AppResult};
use crate::shared::models::{Role, User};
use crate::shared::response::{PageRequest, PageResponse};
use crate::shared::state::Stores;
use crate::shared::store::{Filter, Record, RecordStore};
use crate::shared::utils::date_util::{DateTime, DateUtil};
use crate::shared::validation::Validate;

pub const OWNER_FIELD: &str = "userId";

/// Query string accepted by every list endpoint. Features pick the filters
/// they understand in [`Resource::filters`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
    }

    /// Non-blank search term, if any.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

pub trait Resource: Record {
    /// Human name used in messages, e.g. "Task".
    const NAME: &'static str;
    /// Scoped to the creating user through `userId`.
    const OWNED: bool = true;
    /// Writes restricted to admins; reads stay open to any user.
    const ADMIN_WRITES: bool = false;

    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;

    fn store(stores: &Stores) -> Arc<dyn RecordStore<Self>>;

    fn create(owner_id: &str, input: Self::Create, now: DateTime) -> Self;

    fn apply(&mut self, input: Self::Update, now: DateTime);

    /// Cross-field invariants, checked after create and after every change.
    fn verify(&self) -> AppResult<()> {
        Ok(())
    }

    fn filters(_query: &ListQuery, filter: Filter) -> Filter {
        filter
    }
}

pub struct ResourceService<T: Resource> {
    store: Arc<dyn RecordStore<T>>,
    _marker: PhantomData<T>,
}

impl<T: Resource> ResourceService<T> {
    pub fn new(store: Arc<dyn RecordStore<T>>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn from_stores(stores: &Stores) -> Self {
        Self::new(T::store(stores))
    }

    fn scope(user: &User) -> Filter {
        if T::OWNED {
            Filter::new().eq(OWNER_FIELD, user.id.clone())
        } else {
            Filter::new()
        }
    }

    fn scoped_id(user: &User, id: &str) -> Filter {
        Self::scope(user).eq("_id", id)
    }

    fn ensure_writable(user: &User) -> AppResult<()> {
        if T::ADMIN_WRITES && !user.role.has_permission(Role::Admin) {
            return Err(AppError::Forbidden(
                "You don't have permission to access this resource".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn create(&self, user: &User, input: T::Create) -> AppResult<T> {
        Self::ensure_writable(user)?;

        let record = T::create(&user.id, input, DateUtil::now());
        record.verify()?;
        self.store.insert(&record).await?;

        info!(resource = T::NAME, id = record.id(), user_id = %user.id, "created");
        Ok(record)
    }

    pub async fn find_all(&self, user: &User, query: &ListQuery) -> AppResult<PageResponse<T>> {
        let page = query.page_request();
        let filter = T::filters(query, Self::scope(user));

        let (content, total) = self.store.find_page(&filter, page).await?;
        Ok(PageResponse::new(content, page.page, page.size, total))
    }

    pub async fn find_one(&self, user: &User, id: &str) -> AppResult<T> {
        self.store
            .find_one(&Self::scoped_id(user, id))
            .await?
            .ok_or_else(|| AppError::not_found(T::NAME))
    }

    pub async fn update(&self, user: &User, id: &str, input: T::Update) -> AppResult<T> {
        self.modify(user, id, |record, now| record.apply(input, now))
            .await
    }

    /// Load a record the user may write, change it and store it back.
    pub async fn modify<F>(&self, user: &User, id: &str, change: F) -> AppResult<T>
    where
        F: FnOnce(&mut T, DateTime) + Send,
    {
        Self::ensure_writable(user)?;

        let mut record = self.find_one(user, id).await?;
        change(&mut record, DateUtil::now());
        record.verify()?;

        if !self.store.replace(&record).await? {
            return Err(AppError::not_found(T::NAME));
        }

        info!(resource = T::NAME, id = record.id(), user_id = %user.id, "updated");
        Ok(record)
    }

    pub async fn remove(&self, user: &User, id: &str) -> AppResult<()> {
        Self::ensure_writable(user)?;

        if !self.store.delete_one(&Self::scoped_id(user, id)).await? {
            return Err(AppError::not_found(T::NAME));
        }

        info!(resource = T::NAME, id = id, user_id = %user.id, "deleted");
        Ok(())
    }
}
