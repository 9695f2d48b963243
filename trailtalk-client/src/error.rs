use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `trailtalk-client`.
pub enum ClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Ошибка чтения локального файла (например, изображения для загрузки).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Сервер отклонил запрос (400) или запрос некорректен ещё до отправки.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Неверный `secretKey` (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Пост не найден (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Внутренняя ошибка сервера или неожиданный ответ.
    #[error("server error: {0}")]
    Server(String),

    /// Успешный ответ без поля `data`.
    #[error("empty response")]
    EmptyResponse,
}

/// Результат операций `trailtalk-client`.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: String) -> Self {
        match status {
            reqwest::StatusCode::FORBIDDEN => Self::Forbidden(message),
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            status if status.is_client_error() => Self::InvalidRequest(message),
            _ => Self::Server(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ClientError;

    #[test]
    fn statuses_map_to_error_kinds() {
        assert!(matches!(
            ClientError::from_http_status(reqwest::StatusCode::FORBIDDEN, "x".into()),
            ClientError::Forbidden(_)
        ));
        assert!(matches!(
            ClientError::from_http_status(reqwest::StatusCode::NOT_FOUND, "x".into()),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            ClientError::from_http_status(reqwest::StatusCode::BAD_REQUEST, "x".into()),
            ClientError::InvalidRequest(_)
        ));
        assert!(matches!(
            ClientError::from_http_status(reqwest::StatusCode::BAD_GATEWAY, "x".into()),
            ClientError::Server(_)
        ));
    }
}
