use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::QueryAs;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::database::manager::DatabaseError;
use crate::database::record::{Document, DocumentId, ID_FIELD};
use crate::database::store::{DeleteResult, DocumentStore, InsertResult, UpdateResult};
use crate::filter::{Filter, SqlParam};

/// PostgreSQL backend: one table per collection holding JSONB documents.
///
/// ```sql
/// CREATE TABLE "<collection>" (seq BIGSERIAL, id UUID PRIMARY KEY, doc JSONB NOT NULL)
/// ```
///
/// `seq` preserves insertion order for unordered listings.
pub struct PgDocumentStore {
    pool: PgPool,
    collections: CollectionRegistry,
}

/// Collections whose table is known to exist.
///
/// `CREATE TABLE IF NOT EXISTS` can still fail when two sessions create the
/// same table at once, so creation runs under `creating` and the set is
/// checked again once the lock is held.
#[derive(Default)]
struct CollectionRegistry {
    ensured: RwLock<HashSet<String>>,
    creating: Mutex<()>,
}

impl CollectionRegistry {
    async fn ensure<F, Fut>(&self, collection: &str, create: F) -> Result<(), DatabaseError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), DatabaseError>>,
    {
        if self.ensured.read().await.contains(collection) {
            return Ok(());
        }

        let _creating = self.creating.lock().await;
        if self.ensured.read().await.contains(collection) {
            return Ok(());
        }

        create().await?;
        self.ensured.write().await.insert(collection.to_string());
        Ok(())
    }
}

type DocRowQuery<'q> = QueryAs<'q, Postgres, (Json<Document>,), PgArguments>;

impl PgDocumentStore {
    pub async fn connect(
        connection_string: &str,
        max_connections: u32,
        connection_timeout_secs: u64,
    ) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(connection_timeout_secs))
            .connect(connection_string)
            .await?;
        info!("Connected to PostgreSQL document store (max_connections={})", max_connections);
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            collections: CollectionRegistry::default(),
        }
    }

    /// Create the collection table on first use
    async fn ensure_collection(&self, collection: &str) -> Result<(), DatabaseError> {
        Filter::validate_collection_name(collection)?;

        let pool = &self.pool;
        self.collections
            .ensure(collection, move || async move {
                let ddl = format!(
                    "CREATE TABLE IF NOT EXISTS \"{}\" (seq BIGSERIAL, id UUID PRIMARY KEY, doc JSONB NOT NULL)",
                    collection
                );
                sqlx::query(&ddl).execute(pool).await?;
                debug!("Ensured collection table: {}", collection);
                Ok(())
            })
            .await
    }
}

fn bind_param_query_as<'q>(q: DocRowQuery<'q>, param: &SqlParam) -> DocRowQuery<'q> {
    match param {
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Json(v) => q.bind(Json(v.clone())),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert_one(&self, collection: &str, mut doc: Document) -> Result<InsertResult, DatabaseError> {
        self.ensure_collection(collection).await?;
        let id = DocumentId::generate();
        doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

        let sql = format!("INSERT INTO \"{}\" (id, doc) VALUES ($1, $2)", collection);
        sqlx::query(&sql)
            .bind(*id.as_uuid())
            .bind(Json(doc))
            .execute(&self.pool)
            .await?;

        Ok(InsertResult { acknowledged: true, inserted_id: id })
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        self.ensure_collection(collection).await?;
        let sql_result = filter.to_sql(collection, None)?;
        let mut q = sqlx::query_as::<_, (Json<Document>,)>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(Json(doc),)| doc).collect())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        self.ensure_collection(collection).await?;
        let sql_result = filter.to_sql(collection, Some(1))?;
        let mut q = sqlx::query_as::<_, (Json<Document>,)>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let row = q.fetch_optional(&self.pool).await?;
        Ok(row.map(|(Json(doc),)| doc))
    }

    async fn find_by_id(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>, DatabaseError> {
        self.ensure_collection(collection).await?;
        let sql = format!("SELECT doc FROM \"{}\" WHERE id = $1", collection);
        let row = sqlx::query_as::<_, (Json<Document>,)>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(Json(doc),)| doc))
    }

    async fn update_one(&self, collection: &str, id: &DocumentId, mut set: Document) -> Result<UpdateResult, DatabaseError> {
        self.ensure_collection(collection).await?;
        set.remove(ID_FIELD);

        // jsonb || jsonb overwrites top-level keys only
        let sql = format!("UPDATE \"{}\" SET doc = doc || $1 WHERE id = $2", collection);
        let result = sqlx::query(&sql)
            .bind(Json(set))
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(UpdateResult { matched_count: result.rows_affected() })
    }

    async fn delete_one(&self, collection: &str, id: &DocumentId) -> Result<DeleteResult, DatabaseError> {
        self.ensure_collection(collection).await?;
        let sql = format!("DELETE FROM \"{}\" WHERE id = $1", collection);
        let result = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(DeleteResult { deleted_count: result.rows_affected() })
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn concurrent_first_use_creates_once() {
        let registry = Arc::new(CollectionRegistry::default());
        let created = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let created = created.clone();
                tokio::spawn(async move {
                    registry
                        .ensure("contacts", move || async move {
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            created.fetch_add(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_creation_is_retried() {
        let registry = CollectionRegistry::default();
        let counter = AtomicUsize::new(0);
        let attempts = &counter;

        let err = registry
            .ensure("banners", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(DatabaseError::QueryError("relation busy".to_string()))
            })
            .await;
        assert!(err.is_err());

        registry
            .ensure("banners", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap();
        registry
            .ensure("banners", || async { Err(DatabaseError::QueryError("created twice".to_string())) })
            .await
            .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
