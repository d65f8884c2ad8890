//! Money arithmetic for order totals.
//!
//! All amounts are `Decimal`; nothing here touches binary floating point, so
//! summing any number of totals never drifts. Results are rounded to cents
//! with banker's rounding.

use crate::{
    core::validation::MONEY_SCALE,
    errors::{Error, Result},
};
use rust_decimal::{Decimal, RoundingStrategy};

fn too_large() -> Error {
    Error::invalid_field("items", "order total is too large")
}

/// Total of one line: `quantity * unit_price`.
///
/// # Errors
/// Returns `Error::Validation` when the product does not fit a `Decimal`.
pub fn line_total(quantity: i32, unit_price: Decimal) -> Result<Decimal> {
    Decimal::from(quantity)
        .checked_mul(unit_price)
        .map(|total| total.round_dp(MONEY_SCALE))
        .ok_or_else(too_large)
}

/// Sum of line totals for `(quantity, unit_price)` pairs.
///
/// # Errors
/// Returns `Error::Validation` when a line or the running sum overflows.
pub fn subtotal<I>(lines: I) -> Result<Decimal>
where
    I: IntoIterator<Item = (i32, Decimal)>,
{
    lines
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, (quantity, price)| {
            acc.checked_add(line_total(quantity, price)?)
                .ok_or_else(too_large)
        })
}

/// Sum of already-computed amounts, failing instead of overflowing.
///
/// # Errors
/// Returns `Error::Validation` when the sum does not fit a `Decimal`.
pub fn checked_sum<I>(amounts: I) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| {
            acc.checked_add(amount).ok_or_else(too_large)
        })
}

/// Flat percentage tax on `amount`, rounded half-up to cents.
///
/// # Errors
/// Returns `Error::Validation` when `amount * rate` overflows.
pub fn flat_tax(amount: Decimal, rate_percent: Decimal) -> Result<Decimal> {
    amount
        .checked_mul(rate_percent)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .map(|tax| tax.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(too_large)
}

/// Breakdown of a computed order total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    /// Sum of line totals
    pub subtotal: Decimal,
    /// Tax added on top of the subtotal
    pub tax: Decimal,
    /// `subtotal + tax`
    pub total: Decimal,
}

impl OrderTotals {
    /// Computes totals for a set of lines with an optional flat tax rate.
    ///
    /// # Errors
    /// Returns `Error::Validation` when any step overflows.
    pub fn from_lines<I>(lines: I, tax_rate_percent: Option<Decimal>) -> Result<Self>
    where
        I: IntoIterator<Item = (i32, Decimal)>,
    {
        let subtotal = subtotal(lines)?;
        let tax = match tax_rate_percent {
            Some(rate) => flat_tax(subtotal, rate)?,
            None => Decimal::ZERO,
        };
        let total = subtotal.checked_add(tax).ok_or_else(too_large)?;
        Ok(Self {
            subtotal,
            tax,
            total,
        })
    }
}
