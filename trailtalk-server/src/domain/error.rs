use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("invalid tags: {}", .0.join(", "))]
    InvalidTags(Vec<String>),

    #[error("{0}")]
    InvalidImage(String),

    #[error("invalid post id: {0}")]
    InvalidId(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("forbidden")]
    Forbidden,

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}
