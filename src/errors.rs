//! Unified error type for the service.
//!
//! Core operations raise domain variants (duplicates, not-found, bad credentials);
//! the HTTP layer in [`crate::api`] maps each variant to a status code and the
//! uniform response envelope.

use serde::Serialize;
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending field (camelCase, as sent by the client)
    pub field: String,
    /// Human-readable description of the problem
    pub message: String,
}

impl FieldError {
    /// Builds a field error from anything string-like.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All failures the core and the HTTP boundary can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Unexpected storage failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Registration with an email that already has an account
    #[error("User already exists with this email")]
    DuplicateEmail,

    /// Unknown email or wrong password (deliberately indistinguishable)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, or expired bearer token
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// Entity missing or owned by another tenant
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// SKU already used by this tenant
    #[error("SKU already exists: {sku}")]
    DuplicateSku { sku: String },

    /// Sales order number already used by this tenant
    #[error("Order number already exists: {order_number}")]
    DuplicateOrderNumber { order_number: String },

    /// Purchase order number already used by this tenant
    #[error("PO number already exists: {po_number}")]
    DuplicatePoNumber { po_number: String },

    /// Supplier or customer name already used by this tenant
    #[error("{entity} with this name already exists: {name}")]
    DuplicateName { entity: &'static str, name: String },

    /// Unrecognized order status value
    #[error("Invalid status: {value}")]
    InvalidStatus { value: String },

    /// One or more request fields failed validation
    #[error("Validation failed")]
    Validation { errors: Vec<FieldError> },

    /// A stock decrement would drive quantity below zero
    #[error("Insufficient stock for {sku}: {available} available, {requested} requested")]
    InsufficientStock {
        sku: String,
        available: i32,
        requested: i32,
    },

    /// Inventory item cannot be deleted while order lines reference it
    #[error("Inventory item {sku} is referenced by existing orders")]
    InventoryInUse { sku: String },

    /// Failure inside the password hashing primitive
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// Failure while signing a token
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// I/O failure (socket bind, seed file read)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other unexpected runtime failure
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Shorthand for a validation error on a single field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Returns true for failures that are the caller's fault rather than the server's.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Config { .. }
                | Self::Database(_)
                | Self::PasswordHash(_)
                | Self::Token(_)
                | Self::Io(_)
                | Self::Internal { .. }
        )
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(value: validator::ValidationErrors) -> Self {
        let mut errors = Vec::new();
        crate::core::validation::flatten_errors(None, &value, &mut errors);
        Self::Validation { errors }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Internal {
            message: format!("blocking task failed: {value}"),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(Error::DuplicateEmail.is_client_error());
        assert!(Error::NotFound { entity: "Supplier", id: 1 }.is_client_error());
        assert!(Error::invalid_field("name", "required").is_client_error());
        assert!(
            !Error::Internal {
                message: "boom".to_string()
            }
            .is_client_error()
        );
        assert!(!Error::Database(sea_orm::DbErr::Custom("x".to_string())).is_client_error());
    }

    #[test]
    fn test_not_found_message_names_entity() {
        let err = Error::NotFound {
            entity: "Inventory item",
            id: 42,
        };
        assert_eq!(err.to_string(), "Inventory item not found");
    }
}
