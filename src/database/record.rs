use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Field holding the store-assigned identity of every document
pub const ID_FIELD: &str = "_id";

/// Field holding the creation timestamp for collections that record one
pub const CREATED_AT_FIELD: &str = "createdAt";

/// A schema-less document as stored in a collection
pub type Document = Map<String, Value>;

/// Errors that can occur while turning request input into documents
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("System field '{0}' cannot be set via API input")]
    SystemFieldNotAllowed(&'static str),
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),
}

/// Store-assigned document identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for DocumentId {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| RecordError::InvalidIdentity(format!("'{}' is not a valid id ({})", s, e)))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Parse API input into a document, rejecting non-objects and identity overrides
pub fn document_from_payload(json: Value) -> Result<Document, RecordError> {
    match json {
        Value::Object(map) => {
            if map.contains_key(ID_FIELD) {
                return Err(RecordError::SystemFieldNotAllowed(ID_FIELD));
            }
            Ok(map)
        }
        _ => Err(RecordError::InvalidJson("Expected JSON object".to_string())),
    }
}

/// Current time in the wire format used for `createdAt`
pub fn timestamp_now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Typed views over the handful of fields the service inspects
pub trait DocumentExt {
    fn id(&self) -> Option<DocumentId>;
    fn str_field(&self, field: &str) -> Option<&str>;

    fn status(&self) -> Option<&str> {
        self.str_field("status")
    }
}

impl DocumentExt for Document {
    fn id(&self) -> Option<DocumentId> {
        self.get(ID_FIELD)
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_must_be_object() {
        let err = document_from_payload(json!(["a", "b"])).unwrap_err();
        assert!(matches!(err, RecordError::InvalidJson(_)));
    }

    #[test]
    fn payload_cannot_carry_identity() {
        let err = document_from_payload(json!({"_id": "x", "name": "Jane"})).unwrap_err();
        assert!(matches!(err, RecordError::SystemFieldNotAllowed("_id")));
    }

    #[test]
    fn parses_identity() {
        let id = DocumentId::generate();
        let parsed: DocumentId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-an-id".parse::<DocumentId>().is_err());
        assert!("".parse::<DocumentId>().is_err());
    }

    #[test]
    fn timestamp_is_rfc3339_with_millis() {
        let ts = timestamp_now();
        let s = ts.as_str().unwrap();
        assert!(s.ends_with('Z'), "{}", s);
        assert!(chrono::DateTime::parse_from_rfc3339(s).is_ok());
        assert_eq!(s.len(), "2026-10-18T09:30:00.123Z".len());
    }

    #[test]
    fn typed_views() {
        let id = DocumentId::generate();
        let doc = json!({
            "_id": id.to_string(),
            "email": "jane@example.com",
            "status": 3,
            "createdAt": "2026-10-18T09:30:00.123Z",
        });
        let doc = doc.as_object().unwrap().clone();
        assert_eq!(doc.id(), Some(id));
        assert_eq!(doc.str_field("email"), Some("jane@example.com"));
        assert_eq!(doc.status(), None);
        assert_eq!(doc.str_field(CREATED_AT_FIELD), Some("2026-10-18T09:30:00.123Z"));
    }
}
