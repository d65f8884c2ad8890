//! Route handlers, one module per resource.

pub mod auth;
pub mod customers;
pub mod inventory;
pub mod purchase_orders;
pub mod reports;
pub mod sales_orders;
pub mod suppliers;

use crate::{
    core::validation,
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `?start=&end=` bounds accepted by the order date-range endpoints.
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    /// Range start
    pub start: String,
    /// Range end
    pub end: String,
}

impl DateRangeQuery {
    /// Parses both bounds; each may be RFC 3339 or `YYYY-MM-DD`.
    pub fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let parse = |field: &str, raw: &str| {
            validation::parse_datetime(raw).ok_or_else(|| {
                Error::invalid_field(field, "must be a date (YYYY-MM-DD) or RFC 3339 timestamp")
            })
        };
        Ok((parse("start", &self.start)?, parse("end", &self.end)?))
    }
}
