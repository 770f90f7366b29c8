//! Persistence port shared by every collection.
//!
//! Records describe their collection and indexes once; [`MongoStore`] creates
//! those indexes in MongoDB while [`MemoryStore`] enforces the unique ones
//! itself.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::shared::response::PageRequest;
use crate::shared::utils::date_util::DateTime;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("duplicate value for unique key {0}")]
    Duplicate(String),
    #[error("store operation failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    pub field: &'static str,
    pub descending: bool,
    pub unique: bool,
}

impl IndexSpec {
    pub const fn ascending(field: &'static str) -> Self {
        Self {
            field,
            descending: false,
            unique: false,
        }
    }

    pub const fn descending(field: &'static str) -> Self {
        Self {
            field,
            descending: true,
            unique: false,
        }
    }

    pub const fn unique(field: &'static str) -> Self {
        Self {
            field,
            descending: false,
            unique: true,
        }
    }
}

/// A document stored in its own collection, keyed by a string `_id`.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    const COLLECTION: &'static str;
    const INDEXES: &'static [IndexSpec] = &[];

    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals { field: String, value: String },
    /// Case-insensitive substring match.
    Contains { field: String, needle: String },
}

/// Conjunction of conditions over serialized field names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: &str) -> Self {
        Self::new().eq("_id", id)
    }

    pub fn eq(mut self, field: &str, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Equals {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn contains(mut self, field: &str, needle: impl Into<String>) -> Self {
        self.conditions.push(Condition::Contains {
            field: field.to_string(),
            needle: needle.into(),
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    async fn insert(&self, record: &T) -> Result<(), RepositoryError>;

    async fn find_one(&self, filter: &Filter) -> Result<Option<T>, RepositoryError>;

    /// Matching records, newest first, together with the total match count.
    async fn find_page(
        &self,
        filter: &Filter,
        page: PageRequest,
    ) -> Result<(Vec<T>, u64), RepositoryError>;

    /// Replace the record with the same id. Returns `false` if none exists.
    async fn replace(&self, record: &T) -> Result<bool, RepositoryError>;

    async fn delete_one(&self, filter: &Filter) -> Result<bool, RepositoryError>;
}
