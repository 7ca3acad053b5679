use thiserror::Error;

use crate::error::{db_error, HttpError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Database(err) => db_error(err),
            ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),
            ServiceError::NotFound(_) => HttpError::not_found(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn service_errors_map_to_http_statuses() {
        let err: HttpError = ServiceError::Validation("Unknown setting key: theme".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Unknown setting key: theme");

        let err: HttpError = ServiceError::NotFound("Floor plan").into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Floor plan not found");

        let err: HttpError = ServiceError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
