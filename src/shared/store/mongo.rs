use async_trait::async_trait;
use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tracing::{debug, error};

use super::{Condition, Filter, Record, RecordStore, RepositoryError};
use crate::shared::response::PageRequest;

const DUPLICATE_KEY: i32 = 11000;

pub struct MongoStore<T: Record> {
    collection: Collection<T>,
}

impl<T: Record> MongoStore<T> {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection::<T>(T::COLLECTION),
        }
    }

    /// Create the indexes declared by the record type.
    pub async fn ensure_indexes(&self) -> Result<(), RepositoryError> {
        for index_spec in T::INDEXES {
            let mut keys = Document::new();
            keys.insert(index_spec.field, if index_spec.descending { -1 } else { 1 });

            let index = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(index_spec.unique).build())
                .build();

            self.collection.create_index(index).await.map_err(|e| {
                error!(
                    collection = T::COLLECTION,
                    field = index_spec.field,
                    "index creation failed: {}",
                    e
                );
                map_error::<T>(e)
            })?;
            debug!(collection = T::COLLECTION, field = index_spec.field, "index ensured");
        }
        Ok(())
    }
}

fn to_document(filter: &Filter) -> Document {
    let mut document = Document::new();
    for condition in filter.conditions() {
        match condition {
            Condition::Equals { field, value } => {
                document.insert(field.clone(), value.clone());
            }
            Condition::Contains { field, needle } => {
                document.insert(
                    field.clone(),
                    doc! { "$regex": regex::escape(needle), "$options": "i" },
                );
            }
        }
    }
    document
}

fn map_error<T: Record>(error: MongoError) -> RepositoryError {
    if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = error.kind.as_ref() {
        if write_error.code == DUPLICATE_KEY {
            // The server names the violated index, e.g. "email_1".
            let field = T::INDEXES
                .iter()
                .filter(|index| index.unique)
                .find(|index| write_error.message.contains(index.field))
                .map_or("_id", |index| index.field);
            return RepositoryError::Duplicate(field.to_string());
        }
    }
    RepositoryError::Backend(error.to_string())
}

#[async_trait]
impl<T: Record> RecordStore<T> for MongoStore<T> {
    async fn insert(&self, record: &T) -> Result<(), RepositoryError> {
        self.collection
            .insert_one(record)
            .await
            .map_err(map_error::<T>)?;
        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<T>, RepositoryError> {
        self.collection
            .find_one(to_document(filter))
            .await
            .map_err(map_error::<T>)
    }

    async fn find_page(
        &self,
        filter: &Filter,
        page: PageRequest,
    ) -> Result<(Vec<T>, u64), RepositoryError> {
        let filter = to_document(filter);

        let total = self
            .collection
            .count_documents(filter.clone())
            .await
            .map_err(map_error::<T>)?;

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "createdAt": -1 })
            .skip(page.offset())
            .limit(i64::try_from(page.size).unwrap_or(i64::MAX))
            .await
            .map_err(map_error::<T>)?;
        let records = cursor.try_collect().await.map_err(map_error::<T>)?;

        Ok((records, total))
    }

    async fn replace(&self, record: &T) -> Result<bool, RepositoryError> {
        let result = self
            .collection
            .replace_one(doc! { "_id": record.id() }, record)
            .await
            .map_err(map_error::<T>)?;
        Ok(result.matched_count > 0)
    }

    async fn delete_one(&self, filter: &Filter) -> Result<bool, RepositoryError> {
        let result = self
            .collection
            .delete_one(to_document(filter))
            .await
            .map_err(map_error::<T>)?;
        Ok(result.deleted_count > 0)
    }
}
