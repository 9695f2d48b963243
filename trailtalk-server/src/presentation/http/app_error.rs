use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::domain::error::DomainError;
use crate::infrastructure::uploads::UploadError;
use crate::presentation::http::response::ErrorBody;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("bad request: {0}")]
    BadRequest(String),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Validation { .. }
                | DomainError::InvalidTags(_)
                | DomainError::InvalidImage(_)
                | DomainError::InvalidId(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "Post not found".to_string()),
                DomainError::Forbidden => (StatusCode::FORBIDDEN, "Invalid secret key".to_string()),
                DomainError::Unexpected(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                ),
            },
            AppError::Upload(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = self.status_and_message();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        (status, Json(ErrorBody::new(msg))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::AppError;
    use crate::domain::error::DomainError;
    use crate::infrastructure::uploads::UploadError;

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        let cases = [
            (
                AppError::from(DomainError::Validation {
                    field: "title",
                    message: "is required",
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(DomainError::InvalidTags(vec!["x".to_string()])),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(DomainError::InvalidId("x".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::from(UploadError::MultipleImages), StatusCode::BAD_REQUEST),
            (
                AppError::from(DomainError::InvalidImage("not an image".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::from(DomainError::Forbidden), StatusCode::FORBIDDEN),
            (
                AppError::from(DomainError::NotFound("post".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(DomainError::Unexpected("db down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_and_message().0, expected, "{err}");
        }
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = AppError::from(DomainError::Unexpected("connection refused".to_string()));
        assert_eq!(err.status_and_message().1, "internal error");
    }
}
