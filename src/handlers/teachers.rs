use axum::extract::State;
use serde_json::json;

use crate::database::record::Document;
use crate::middleware::{ApiResponse, ApiResult};
use crate::resources::ResourceService;

/// Only teachers with this status are visible on the public listing
pub const PUBLIC_STATUS: &str = "approved";

/// GET /teachers - approved teachers only
pub async fn list_approved(State(service): State<ResourceService>) -> ApiResult<Vec<Document>> {
    let docs = service.list_all(Some(json!({ "status": PUBLIC_STATUS }))).await?;
    Ok(ApiResponse::success(docs))
}
