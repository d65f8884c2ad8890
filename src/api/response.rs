//! The uniform JSON envelope every endpoint answers with.

use crate::errors::FieldError;
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// `{success, data?, message?, error?, total?, errors?}`
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human readable note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error summary on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Row count, set on list responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    /// Per-field details, set on validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            total: None,
            errors: None,
        }
    }

    /// Success with only a message and no payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
            total: None,
            errors: None,
        }
    }

    /// Attaches a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Successful list response; `total` is the number of rows.
    pub fn list(items: Vec<T>) -> Self {
        let total = items.len();
        Self {
            total: Some(total),
            ..Self::ok(items)
        }
    }
}

impl ApiResponse<()> {
    /// Failure envelope.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
            total: None,
            errors: None,
        }
    }

    /// Failure envelope listing every rejected field.
    pub fn invalid(errors: Vec<FieldError>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::failure("Validation failed")
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
