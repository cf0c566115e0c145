//! In-process document store.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{
    Collection, Document, DocumentStore, Filter, StoreError, ensure_object, new_document_id,
};

/// Document store kept in memory.
///
/// Documents are held per collection in insertion order. Overwriting an
/// existing id keeps its original position. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reject `data` if another document in `docs` shares its unique field.
fn check_unique(
    collection: Collection,
    docs: &[Document],
    id: &str,
    data: &Value,
) -> Result<(), StoreError> {
    let Some(field) = collection.unique_field() else {
        return Ok(());
    };
    let Some(value) = data.get(field) else {
        return Ok(());
    };
    if docs
        .iter()
        .any(|doc| doc.id != id && doc.data.get(field) == Some(value))
    {
        return Err(StoreError::Duplicate { collection, field });
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(&doc.data))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn put(&self, collection: Collection, id: &str, data: Value) -> Result<(), StoreError> {
        ensure_object(&data)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        check_unique(collection, docs, id, &data)?;
        match docs.iter_mut().find(|doc| doc.id == id) {
            Some(existing) => existing.data = data,
            None => docs.push(Document {
                id: id.to_owned(),
                data,
            }),
        }
        Ok(())
    }

    async fn add(&self, collection: Collection, data: Value) -> Result<String, StoreError> {
        ensure_object(&data)?;
        let id = new_document_id();
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        check_unique(collection, docs, &id, &data)?;
        docs.push(Document {
            id: id.clone(),
            data,
        });
        Ok(id)
    }

    async fn patch(
        &self,
        collection: Collection,
        id: &str,
        fields: Value,
    ) -> Result<(), StoreError> {
        let Value::Object(fields) = fields else {
            return Err(StoreError::NotAnObject);
        };

        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_owned(),
            })?;

        if let Value::Object(target) = &mut existing.data {
            target.extend(fields);
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        if let Some(docs) = self.collections.write().await.get_mut(&collection) {
            docs.retain(|doc| doc.id != id);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
