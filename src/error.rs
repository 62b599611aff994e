use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::sequence::{AllocateError, StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("authentication required")]
    Unauthorized,

    #[error("missing permission {0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Allocate(#[from] AllocateError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => return AppError::Conflict(db_err.message().to_string()),
                // foreign_key_violation, check_violation
                Some("23503") | Some("23514") => {
                    return AppError::BadRequest(db_err.message().to_string())
                }
                _ => {}
            }
        }
        AppError::Database(err)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Allocate(AllocateError::StoreUnavailable { .. }) | AppError::Store(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Allocate(AllocateError::UnknownEntityKind(_)) | AppError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let message = match &self {
            AppError::Database(_) => "internal database error".to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_errors_map_to_server_statuses() {
        let unavailable = AppError::from(AllocateError::StoreUnavailable {
            kind: "Brand".to_string(),
            attempts: 5,
            source: StoreError::Unavailable("connection refused".to_string()),
        });
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);

        let unknown = AppError::from(AllocateError::UnknownEntityKind("Unicorn".to_string()));
        assert_eq!(unknown.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn client_errors_keep_their_status() {
        assert_eq!(AppError::NotFound("brand").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("catalog:write").status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::BadRequest("quantity must be positive".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn row_not_found_is_a_database_error() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
