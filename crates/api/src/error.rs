//! JSON error responses built from the shared error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use tradewind_shared::AppError;

/// Renders an [`AppError`] as a JSON body with its stable error code.
pub fn app_error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code().to_lowercase(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}

/// 400 validation failure.
pub fn bad_request(message: impl Into<String>) -> Response {
    app_error_response(&AppError::Validation(message.into()))
}

/// Generic 500 that does not leak internals.
pub fn internal_error() -> Response {
    app_error_response(&AppError::Internal("An error occurred".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_is_400() {
        let response = bad_request("Unknown currency 'XXX'");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_is_500() {
        let response = internal_error();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_follows_the_taxonomy() {
        let response = app_error_response(&AppError::Conflict("duplicate".to_string()));
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
