use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use database::error::ServiceError;
use log::error;
use serde_json::json;
use storage::StorageError;

/// Route-level failure, converted into the `{success: false, message}`
/// envelope with the matching status code.
pub enum ApiError {
    Service(ServiceError),
    Storage(StorageError),
    BadRequest(String),
    NotFound(String),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Service(e) if e.is_not_found() => (StatusCode::NOT_FOUND, e.to_string()),
            Self::Service(e) if e.is_internal() => {
                error!("database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
            Self::Service(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::Storage(e) => match e {
                StorageError::LinkExpired | StorageError::InvalidSignature => {
                    (StatusCode::FORBIDDEN, e.to_string())
                }
                StorageError::NotFound => (StatusCode::NOT_FOUND, e.to_string()),
                e if e.is_client_error() => (StatusCode::BAD_REQUEST, e.to_string()),
                e => {
                    error!("storage error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_owned(),
                    )
                }
            },
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}
