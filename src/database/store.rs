use async_trait::async_trait;
use serde::Serialize;

use crate::database::manager::DatabaseError;
use crate::database::record::{Document, DocumentId};
use crate::filter::Filter;

/// Outcome of a single insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: DocumentId,
}

/// Outcome of a single-document update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub matched_count: u64,
}

/// Outcome of a single-document delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// One atomic call per method against a named collection.
///
/// Implementations assign identities on insert and store them in the `_id`
/// field of the document they hand back from reads.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<InsertResult, DatabaseError>;

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError>;

    async fn find_by_id(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>, DatabaseError>;

    /// Shallow merge of `set` into the stored document
    async fn update_one(&self, collection: &str, id: &DocumentId, set: Document) -> Result<UpdateResult, DatabaseError>;

    async fn delete_one(&self, collection: &str, id: &DocumentId) -> Result<DeleteResult, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}
