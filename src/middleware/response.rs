use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Body of every mutation response
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Successful response; reads serialize the data bare, mutations use `MessageBody`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None, // Default to 200 OK
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }
}

impl ApiResponse<MessageBody> {
    /// 200 `{ message }`
    pub fn message(message: impl Into<String>) -> Self {
        Self::success(MessageBody { message: message.into(), result: None })
    }

    /// 201 `{ message, result }`
    pub fn created(message: impl Into<String>, result: impl Serialize) -> Self {
        let result = serde_json::to_value(result).ok();
        Self::with_status(MessageBody { message: message.into(), result }, StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        match serde_json::to_value(&self.data) {
            Ok(value) => (status, Json(value)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Failed to serialize response data",
                        "details": e.to_string()
                    })),
                )
                    .into_response()
            }
        }
    }
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_body_omits_missing_result() {
        let body = serde_json::to_value(ApiResponse::message("Banner updated successfully").data).unwrap();
        assert_eq!(body, json!({"message": "Banner updated successfully"}));
    }

    #[test]
    fn created_is_201_with_result() {
        let response = ApiResponse::created("User added successfully", json!({"acknowledged": true}));
        assert_eq!(response.status_code, Some(StatusCode::CREATED));
        assert_eq!(response.data.result, Some(json!({"acknowledged": true})));
    }
}
