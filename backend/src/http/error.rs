//! HTTP error handling.
//!
//! Clients only ever see a fixed message; repository errors are logged in
//! full before the response is built.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use super::dto::ErrorBody;
use crate::db::repository::RepositoryError;
use crate::routes::FieldError;

pub const INVALID_USER_ID: &str = "Invalid user ID";
pub const USER_NOT_FOUND: &str = "User not found";

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (malformed id or field)
    BadRequest(String),
    /// Resource not found
    NotFound(String),
    /// Store failure, answered with a fixed per-operation message
    Persistence {
        operation: &'static str,
        message: &'static str,
        source: RepositoryError,
    },
}

impl AppError {
    /// Map a repository failure of `operation` to its response.
    ///
    /// `NotFound` becomes a 404; anything else is a 500 carrying `message`.
    pub fn store(
        operation: &'static str,
        message: &'static str,
    ) -> impl FnOnce(RepositoryError) -> AppError {
        move |source| {
            if source.is_not_found() {
                warn!(operation, error = %source, "record not found");
                AppError::NotFound(USER_NOT_FOUND.to_string())
            } else {
                AppError::Persistence {
                    operation,
                    message,
                    source,
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest(msg) | AppError::NotFound(msg) => msg,
            AppError::Persistence {
                operation,
                message,
                source,
            } => {
                error!(operation, error = %source, "repository operation failed");
                message.to_string()
            }
        };

        (status, Json(ErrorBody::new(message))).into_response()
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AppError::store("get_logs", "Failed to fetch user logs")(
            RepositoryError::not_found("User not found"),
        );
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == USER_NOT_FOUND));
    }

    #[test]
    fn test_store_failure_keeps_fixed_message() {
        let err = AppError::store("add_exercise", "Failed to add exercise")(
            RepositoryError::connection("connection refused"),
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        match err {
            AppError::Persistence { message, source, .. } => {
                assert_eq!(message, "Failed to add exercise");
                assert!(source.is_retryable());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_field_error_is_bad_request() {
        let err = AppError::from(FieldError::Missing("description"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
