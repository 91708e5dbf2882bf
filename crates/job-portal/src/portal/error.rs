use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::authorization::AccessDenied;
use super::store::RepositoryError;

/// Coarse failure classification callers branch on (e.g. 403 versus 404).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    InvalidState,
    InvalidInput,
    Unauthorized,
    Unavailable,
}

/// Error raised by the portal services. Every variant carries a human-readable message.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl PortalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PortalError::NotFound(_) => ErrorKind::NotFound,
            PortalError::Forbidden(_) => ErrorKind::Forbidden,
            PortalError::Conflict(_) => ErrorKind::Conflict,
            PortalError::InvalidState(_) => ErrorKind::InvalidState,
            PortalError::InvalidInput(_) => ErrorKind::InvalidInput,
            PortalError::Unauthorized(_) => ErrorKind::Unauthorized,
            PortalError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::InvalidState | ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }
}

impl From<RepositoryError> for PortalError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict(constraint) => {
                Self::Conflict(format!("duplicate value for unique constraint {constraint}"))
            }
            RepositoryError::NotFound => Self::NotFound("record"),
            RepositoryError::Unavailable(reason) => Self::Unavailable(reason),
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "portal request failed");
        }

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
