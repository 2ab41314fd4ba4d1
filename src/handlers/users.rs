use axum::extract::{Path, State};
use serde_json::Value;

use crate::database::record::Document;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, MessageBody};
use crate::resources::ResourceService;

use super::resource::update_single_field;

/// GET /users/email/:email - lookup used by the frontend for role checks
pub async fn show_by_email(State(service): State<ResourceService>, Path(email): Path<String>) -> ApiResult<Document> {
    let doc = service.get_by_field("email", Value::String(email)).await?;
    Ok(ApiResponse::success(doc))
}

/// PATCH /users/:id/role - body `{ "role": "admin" | "user" }`
pub async fn update_role(
    State(service): State<ResourceService>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody,
) -> ApiResult<MessageBody> {
    update_single_field(&service, &id, "role", payload).await
}
