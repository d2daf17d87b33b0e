use axum::{
    extract::rejection::{FormRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use branchdesk_core::db::DbError;
use branchdesk_core::{BranchServiceError, RepoError};
use log::{error, warn};
use serde_json::json;
use std::fmt;

pub type AppResult<T> = Result<T, AppError>;

/// Error returned by every handler, rendered as a JSON envelope.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                "event=http_error module=server status={} error={}",
                self.status.as_u16(),
                self.message
            );
        } else {
            warn!(
                "event=http_error module=server status={} error={}",
                self.status.as_u16(),
                self.message
            );
        }

        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<BranchServiceError> for AppError {
    fn from(err: BranchServiceError) -> Self {
        match err {
            BranchServiceError::Invalid(_) => Self::bad_request(err.to_string()),
            BranchServiceError::BranchNotFound(_) => Self::not_found(err.to_string()),
            BranchServiceError::Repo(repo) => repo.into(),
            BranchServiceError::InconsistentState(_) => Self::internal(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(_) | RepoError::UnknownField(_) => {
                Self::bad_request(err.to_string())
            }
            RepoError::NotFound(_) | RepoError::NoMatchingRecord { .. } => {
                Self::not_found(err.to_string())
            }
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<FormRejection> for AppError {
    fn from(err: FormRejection) -> Self {
        Self::bad_request(err.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(err: QueryRejection) -> Self {
        Self::bad_request(err.body_text())
    }
}
