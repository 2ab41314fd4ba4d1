// Generic handler family shared by every resource router.
use axum::extract::{Path, State};
use serde_json::Value;

use crate::database::record::Document;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, MessageBody};
use crate::resources::ResourceService;

/// POST /{resource}
pub async fn create(State(service): State<ResourceService>, JsonBody(payload): JsonBody) -> ApiResult<MessageBody> {
    let result = service.create(payload).await?;
    Ok(ApiResponse::created(
        format!("{} added successfully", service.resource().label),
        result,
    ))
}

/// GET /{resource}
pub async fn list(State(service): State<ResourceService>) -> ApiResult<Vec<Document>> {
    let docs = service.list_all(None).await?;
    Ok(ApiResponse::success(docs))
}

/// GET /{resource}/:id
pub async fn show(State(service): State<ResourceService>, Path(id): Path<String>) -> ApiResult<Document> {
    let doc = service.get_by_id(&id).await?;
    Ok(ApiResponse::success(doc))
}

/// PUT /{resource}/:id
pub async fn update(
    State(service): State<ResourceService>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody,
) -> ApiResult<MessageBody> {
    service.update_by_id(&id, payload).await?;
    Ok(ApiResponse::message(format!("{} updated successfully", service.resource().label)))
}

/// PATCH /{resource}/:id/status
pub async fn update_status(
    State(service): State<ResourceService>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody,
) -> ApiResult<MessageBody> {
    update_single_field(&service, &id, "status", payload).await
}

/// DELETE /{resource}/:id
pub async fn delete(State(service): State<ResourceService>, Path(id): Path<String>) -> ApiResult<MessageBody> {
    service.delete_by_id(&id).await?;
    Ok(ApiResponse::message(format!("{} deleted successfully", service.resource().label)))
}

/// Set `field` from `{ "<field>": value }`
pub(super) async fn update_single_field(
    service: &ResourceService,
    id: &str,
    field: &str,
    payload: Value,
) -> ApiResult<MessageBody> {
    let value = payload.get(field).cloned();
    let shown = match &value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    service.update_field(id, field, value).await?;
    Ok(ApiResponse::message(format!(
        "{} {} updated to {}",
        service.resource().label,
        field,
        shown
    )))
}
