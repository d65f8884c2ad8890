//! Core business logic - framework-agnostic operations over the entities.
//!
//! Every function takes the acting user's id and scopes all reads and writes
//! to it; a row owned by someone else is indistinguishable from a missing row.

/// Registration, login, and bearer-token handling
pub mod auth;
/// Customer directory
pub mod customer;
/// Inventory catalog ledger
pub mod inventory;
/// Money arithmetic for order totals
pub mod pricing;
/// Purchase orders and overdue delivery alerts
pub mod purchase_order;
/// Dashboard summary over all tenant data
pub mod report;
/// Sales orders and the stock they consume
pub mod sales_order;
/// Supplier directory
pub mod supplier;
/// Field-level validation helpers
pub mod validation;

use crate::errors::Error;
use sea_orm::{DbErr, SqlErr};
use serde::Deserialize;

/// Result of deleting a directory record.
///
/// Records still referenced elsewhere are deactivated instead of removed, so a
/// delete request always either removes or deactivates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome<M> {
    /// The record was removed
    Deleted,
    /// The record is referenced elsewhere and was marked inactive instead
    Deactivated(M),
}

/// Explicit change of a directory record's active flag.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    /// New value of the flag
    pub is_active: bool,
}

/// Maps a unique-constraint violation from the database to a domain error.
///
/// The pre-checks in each module catch the common case; this closes the window
/// between check and write when two requests race.
pub(crate) fn on_unique_violation<F>(err: DbErr, conflict: F) -> Error
where
    F: FnOnce() -> Error,
{
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => conflict(),
        _ => Error::Database(err),
    }
}

/// Maximum number of rows a directory search returns.
pub const SEARCH_LIMIT: u64 = 10;

/// Builds a lower-cased `LIKE` pattern matching `term` anywhere, with `%`, `_`
/// and `\` escaped so they match literally.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.trim().to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
