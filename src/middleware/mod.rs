pub mod json_body;
pub mod query_params;
pub mod response;

pub use json_body::JsonBody;
pub use query_params::QueryParams;
pub use response::{ApiResponse, ApiResult, MessageBody};
