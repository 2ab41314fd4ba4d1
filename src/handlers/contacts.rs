use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::record::Document;
use crate::middleware::{ApiResponse, ApiResult, QueryParams};
use crate::resources::ResourceService;

/// Fields scanned by the free-text `search` parameter
const SEARCH_FIELDS: &[&str] = &["name", "email", "message"];

#[derive(Debug, Default, Deserialize)]
pub struct ContactQuery {
    /// Case-insensitive substring over name, email and message
    pub search: Option<String>,
    /// Exact status; `all` disables the restriction
    pub status: Option<String>,
}

impl ContactQuery {
    pub fn to_where_clause(&self) -> Option<Value> {
        let mut clauses = Vec::new();

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let any_field: Vec<Value> = SEARCH_FIELDS
                .iter()
                .map(|field| json!({ *field: { "$icontains": search } }))
                .collect();
            clauses.push(json!({ "$or": any_field }));
        }

        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty() && *s != "all") {
            clauses.push(json!({ "status": status }));
        }

        if clauses.is_empty() {
            None
        } else {
            Some(json!({ "$and": clauses }))
        }
    }
}

/// GET /contacts?search=&status=
pub async fn list(State(service): State<ResourceService>, QueryParams(query): QueryParams<ContactQuery>) -> ApiResult<Vec<Document>> {
    let docs = service.list_all(query.to_where_clause()).await?;
    Ok(ApiResponse::success(docs))
}
