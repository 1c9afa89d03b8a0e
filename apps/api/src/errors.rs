use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::Unparseable;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unparseable document: {0}")]
    Unparseable(#[from] Unparseable),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unparseable(e) => {
                tracing::info!("Rejected unparseable document: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "UNPARSEABLE",
                    e.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Rejects a blank required text field with a 400.
pub fn require_text<'a>(value: &'a str, field: &str) -> Result<&'a str, AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("'{field}' must not be empty")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let validation = AppError::Validation("bad".to_string()).into_response();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let unparseable = AppError::from(Unparseable::Empty).into_response();
        assert_eq!(unparseable.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let internal = AppError::from(anyhow::anyhow!("boom")).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("  \n", "text").is_err());
        assert_eq!(require_text("hello", "text").unwrap(), "hello");
    }
}
