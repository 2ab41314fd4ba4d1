use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::database::manager::DatabaseError;
use crate::database::record::{document_from_payload, Document, DocumentId, RecordError};
use crate::database::store::{DocumentStore, InsertResult};
use crate::filter::{Filter, FilterData};

use super::error::ServiceError;
use super::Resource;

/// CRUD operations for one resource over a shared store handle
#[derive(Clone)]
pub struct ResourceService {
    store: Arc<dyn DocumentStore>,
    resource: &'static Resource,
}

impl ResourceService {
    pub fn new(store: Arc<dyn DocumentStore>, resource: &'static Resource) -> Self {
        Self { store, resource }
    }

    pub fn resource(&self) -> &'static Resource {
        self.resource
    }

    /// Insert `payload` merged with the resource defaults.
    ///
    /// Resources with a unique field look for an existing match first and
    /// fail with `Conflict` without inserting. The check and the insert are
    /// separate store calls, so concurrent creates may both pass it.
    ///
    /// A payload without the unique field (or with it set to `null`) skips
    /// the check, so any number of users without an `email` can be created;
    /// an equality lookup on the missing field would report a conflict for
    /// the second one.
    pub async fn create(&self, payload: Value) -> Result<InsertResult, ServiceError> {
        let mut doc = document_from_payload(payload).map_err(|e| self.record_error(e))?;
        for default in self.resource.defaults {
            doc.insert(default.field.to_string(), default.value.resolve());
        }

        let context = format!("Failed to add {}", self.resource.singular);

        if let Some(field) = self.resource.unique_field {
            if let Some(value) = doc.get(field).filter(|v| !v.is_null()) {
                let existing = self
                    .store
                    .find_one(self.resource.collection, &Filter::by_field(field, value.clone()))
                    .await
                    .map_err(|e| self.store_failure(&context, e))?;
                if existing.is_some() {
                    warn!("Rejected duplicate {} with {} {}", self.resource.singular, field, value);
                    return Err(ServiceError::Conflict(format!("{} already exists", self.resource.label)));
                }
            }
        }

        let result = self
            .store
            .insert_one(self.resource.collection, doc)
            .await
            .map_err(|e| self.store_failure(&context, e))?;

        info!("Created {} {}", self.resource.singular, result.inserted_id);
        Ok(result)
    }

    /// Every document matching `where_clause`, in the resource's listing order
    pub async fn list_all(&self, where_clause: Option<Value>) -> Result<Vec<Document>, ServiceError> {
        let filter = Filter::from_data(FilterData {
            where_clause,
            order: self.resource.order.map(|o| Value::String(o.to_string())),
        })
        .map_err(|e| ServiceError::ValidationFailed(e.to_string()))?;

        self.store
            .find(self.resource.collection, &filter)
            .await
            .map_err(|e| self.store_failure(&format!("Failed to fetch {}", self.resource.plural), e))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Document, ServiceError> {
        let id = self.parse_id(id)?;
        self.store
            .find_by_id(self.resource.collection, &id)
            .await
            .map_err(|e| self.store_failure(&format!("Failed to fetch {}", self.resource.singular), e))?
            .ok_or_else(|| self.not_found())
    }

    /// First document whose `field` equals `value` exactly
    pub async fn get_by_field(&self, field: &str, value: Value) -> Result<Document, ServiceError> {
        self.store
            .find_one(self.resource.collection, &Filter::by_field(field, value))
            .await
            .map_err(|e| self.store_failure(&format!("Failed to fetch {}", self.resource.singular), e))?
            .ok_or_else(|| self.not_found())
    }

    /// Shallow merge of `payload` into the stored document
    pub async fn update_by_id(&self, id: &str, payload: Value) -> Result<(), ServiceError> {
        let id = self.parse_id(id)?;
        let changes = document_from_payload(payload).map_err(|e| self.record_error(e))?;
        let context = format!("Failed to update {}", self.resource.singular);
        self.apply_update(&id, changes, &context).await?;
        info!("Updated {} {}", self.resource.singular, id);
        Ok(())
    }

    /// Set exactly one declared field, checking its allowed values first
    pub async fn update_field(&self, id: &str, field: &str, value: Option<Value>) -> Result<(), ServiceError> {
        let rule = self.resource.field_rule(field).ok_or_else(|| {
            ServiceError::ValidationFailed(format!("Field '{}' cannot be updated on its own", field))
        })?;

        let value = value
            .filter(|v| !v.is_null())
            .ok_or_else(|| self.record_error(RecordError::MissingRequiredField(field.to_string())))?;

        if let Some(allowed) = rule.allowed {
            let accepted = value.as_str().map(|s| allowed.contains(&s)).unwrap_or(false);
            if !accepted {
                let choices: Vec<String> = allowed.iter().map(|a| format!("'{}'", a)).collect();
                return Err(ServiceError::ValidationFailed(format!(
                    "Invalid {}. Must be {}.",
                    field,
                    choices.join(" or ")
                )));
            }
        }

        let id = self.parse_id(id)?;
        let mut changes = Map::new();
        changes.insert(field.to_string(), value);
        let context = format!("Failed to update {} {}", self.resource.singular, field);
        self.apply_update(&id, changes, &context).await?;
        info!("Updated {} {} {}", self.resource.singular, id, field);
        Ok(())
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<(), ServiceError> {
        let id = self.parse_id(id)?;
        let result = self
            .store
            .delete_one(self.resource.collection, &id)
            .await
            .map_err(|e| self.store_failure(&format!("Failed to delete {}", self.resource.singular), e))?;

        if result.deleted_count == 0 {
            return Err(self.not_found());
        }
        info!("Deleted {} {}", self.resource.singular, id);
        Ok(())
    }

    async fn apply_update(&self, id: &DocumentId, changes: Document, context: &str) -> Result<(), ServiceError> {
        let result = self
            .store
            .update_one(self.resource.collection, id, changes)
            .await
            .map_err(|e| self.store_failure(context, e))?;

        if result.matched_count == 0 {
            return Err(self.not_found());
        }
        Ok(())
    }

    fn parse_id(&self, id: &str) -> Result<DocumentId, ServiceError> {
        id.parse().map_err(|e| self.record_error(e))
    }

    fn not_found(&self) -> ServiceError {
        ServiceError::NotFound(format!("{} not found", self.resource.label))
    }

    fn record_error(&self, err: RecordError) -> ServiceError {
        match err {
            RecordError::InvalidIdentity(details) => ServiceError::InvalidIdentity {
                resource: self.resource.singular,
                details,
            },
            other => ServiceError::ValidationFailed(other.to_string()),
        }
    }

    fn store_failure(&self, context: &str, source: DatabaseError) -> ServiceError {
        error!("{} ({}): {}", context, self.resource.collection, source);
        ServiceError::StoreFailure {
            context: context.to_string(),
            source,
        }
    }
}
