use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Condition, Filter, Record, RecordStore, RepositoryError};
use crate::shared::response::PageRequest;

/// Process-local store used when no database is configured, and in tests.
pub struct MemoryStore<T: Record> {
    records: RwLock<Vec<T>>,
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_value<T: Record>(record: &T) -> Result<Value, RepositoryError> {
    serde_json::to_value(record).map_err(|e| RepositoryError::Backend(e.to_string()))
}

fn matches(document: &Value, filter: &Filter) -> bool {
    filter.conditions().iter().all(|condition| match condition {
        Condition::Equals { field, value } => {
            document.get(field).and_then(Value::as_str) == Some(value.as_str())
        }
        Condition::Contains { field, needle } => document
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
    })
}

/// Fails if another record already holds a value of one of `T`'s unique keys.
fn check_unique<T: Record>(existing: &[T], candidate: &T) -> Result<(), RepositoryError> {
    let unique_fields: Vec<&str> = T::INDEXES
        .iter()
        .filter(|index| index.unique)
        .map(|index| index.field)
        .collect();
    if unique_fields.is_empty() {
        return Ok(());
    }

    let candidate_value = to_value(candidate)?;
    for other in existing.iter().filter(|other| other.id() != candidate.id()) {
        let other_value = to_value(other)?;
        for field in &unique_fields {
            let taken = candidate_value.get(*field);
            if taken.is_some() && taken == other_value.get(*field) {
                return Err(RepositoryError::Duplicate(field.to_string()));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl<T: Record> RecordStore<T> for MemoryStore<T> {
    async fn insert(&self, record: &T) -> Result<(), RepositoryError> {
        // Check and insert under one write lock so racing inserts of the same
        // unique key cannot both succeed.
        let mut records = self.records.write().await;
        if records.iter().any(|existing| existing.id() == record.id()) {
            return Err(RepositoryError::Duplicate("_id".to_string()));
        }
        check_unique(&records, record)?;
        records.push(record.clone());
        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<T>, RepositoryError> {
        let records = self.records.read().await;
        for record in records.iter() {
            if matches(&to_value(record)?, filter) {
                return Ok(Some(record.clone()));
            }
        }
        Ok(None)
    }

    async fn find_page(
        &self,
        filter: &Filter,
        page: PageRequest,
    ) -> Result<(Vec<T>, u64), RepositoryError> {
        let records = self.records.read().await;

        let mut matched = Vec::new();
        for record in records.iter().rev() {
            if matches(&to_value(record)?, filter) {
                matched.push(record.clone());
            }
        }
        matched.sort_by_key(|record| std::cmp::Reverse(record.created_at()));

        let total = matched.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(page.size).unwrap_or(usize::MAX);
        let content = matched.into_iter().skip(offset).take(size).collect();

        Ok((content, total))
    }

    async fn replace(&self, record: &T) -> Result<bool, RepositoryError> {
        let mut records = self.records.write().await;
        let Some(position) = records.iter().position(|existing| existing.id() == record.id())
        else {
            return Ok(false);
        };
        check_unique(&records, record)?;
        records[position] = record.clone();
        Ok(true)
    }

    async fn delete_one(&self, filter: &Filter) -> Result<bool, RepositoryError> {
        let mut records = self.records.write().await;
        let mut position = None;
        for (index, record) in records.iter().enumerate() {
            if matches(&to_value(record)?, filter) {
                position = Some(index);
                break;
            }
        }
        Ok(position.map(|index| records.remove(index)).is_some())
    }
}
