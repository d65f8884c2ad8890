//! Maps [`Error`] onto HTTP status codes and the response envelope.
//!
//! Server-side failures are logged in full and answered with a generic
//! message; nothing about the storage layer reaches the client.

use crate::{api::response::ApiResponse, errors::Error};
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

impl Error {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::InvalidStatus { .. }
            | Self::DuplicateEmail
            | Self::DuplicateSku { .. }
            | Self::DuplicateOrderNumber { .. }
            | Self::DuplicatePoNumber { .. }
            | Self::DuplicateName { .. }
            | Self::InsufficientStock { .. }
            | Self::InventoryInUse { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Config { .. }
            | Self::Database(_)
            | Self::PasswordHash(_)
            | Self::Token(_)
            | Self::Io(_)
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::Validation { errors } => ApiResponse::invalid(errors),
            Self::Unauthorized { ref reason } => {
                warn!(%reason, "Rejected request");
                ApiResponse::failure(self.to_string())
            }
            err if status.is_server_error() => {
                error!(error = %err, "Request failed");
                ApiResponse::failure("Internal server error")
            }
            err => ApiResponse::failure(err.to_string()),
        };
        (status, body).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_field("body", rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::invalid_field("path", rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid_field("query", rejection.body_text())
    }
}
