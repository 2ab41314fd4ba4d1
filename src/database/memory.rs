use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::record::{Document, DocumentExt, DocumentId, ID_FIELD};
use crate::database::store::{DeleteResult, DocumentStore, InsertResult, UpdateResult};
use crate::filter::Filter;

/// Process-local store; collections keep insertion order
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_collection(collection: &str) -> Result<(), DatabaseError> {
        Filter::validate_collection_name(collection)?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: &str, mut doc: Document) -> Result<InsertResult, DatabaseError> {
        Self::check_collection(collection)?;
        let id = DocumentId::generate();
        doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_default().push(doc);

        Ok(InsertResult { acknowledged: true, inserted_id: id })
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        Self::check_collection(collection)?;
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(vec![]);
        };

        let mut matched: Vec<(usize, &Document)> = docs
            .iter()
            .enumerate()
            .filter(|(_, doc)| filter.matches(doc))
            .collect();
        matched.sort_by(|a, b| filter.compare(*a, *b));

        Ok(matched.into_iter().map(|(_, doc)| doc.clone()).collect())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        Ok(self.find(collection, filter).await?.into_iter().next())
    }

    async fn find_by_id(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>, DatabaseError> {
        Self::check_collection(collection)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id().as_ref() == Some(id)))
            .cloned())
    }

    async fn update_one(&self, collection: &str, id: &DocumentId, set: Document) -> Result<UpdateResult, DatabaseError> {
        Self::check_collection(collection)?;
        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id().as_ref() == Some(id)));

        match target {
            Some(doc) => {
                for (key, value) in set {
                    if key != ID_FIELD {
                        doc.insert(key, value);
                    }
                }
                Ok(UpdateResult { matched_count: 1 })
            }
            None => Ok(UpdateResult { matched_count: 0 }),
        }
    }

    async fn delete_one(&self, collection: &str, id: &DocumentId) -> Result<DeleteResult, DatabaseError> {
        Self::check_collection(collection)?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(DeleteResult { deleted_count: 0 });
        };

        match docs.iter().position(|doc| doc.id().as_ref() == Some(id)) {
            Some(index) => {
                docs.remove(index);
                Ok(DeleteResult { deleted_count: 1 })
            }
            None => Ok(DeleteResult { deleted_count: 0 }),
        }
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
