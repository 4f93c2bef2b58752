pub mod agencies;
pub mod health;
pub mod reservations;
pub mod vehicles;

use axum::http::StatusCode;
use axum::Json;
use tracing::error;

use crate::api::dto::ApiResponse;
use crate::domain::DomainError;

/// Map a domain error to an HTTP response. Storage failures become a
/// generic 500; the detail goes to the log only.
pub(crate) fn error_response<T>(err: DomainError) -> (StatusCode, Json<ApiResponse<T>>) {
    let status = match &err {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("request failed: {}", err);
        (status, Json(ApiResponse::error("Internal server error")))
    } else {
        (status, Json(ApiResponse::error(err.to_string())))
    }
}
