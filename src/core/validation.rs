//! Field-level validation helpers shared by every request payload.
//!
//! Payload structs derive [`validator::Validate`]; the custom checks here cover
//! what the derive cannot express for decimals and blank strings. Failures are
//! flattened into `(field, message)` pairs for the error envelope.

use crate::errors::FieldError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

/// Maximum number of decimal places accepted for money fields.
pub const MONEY_SCALE: u32 = 2;

/// Exclusive upper bound for money fields, matching the `DECIMAL(12,2)` columns.
pub const MONEY_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Rejects empty or whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", "must not be blank"));
    }
    Ok(())
}

/// Accepts non-negative amounts below [`MONEY_LIMIT`] with at most two decimal places.
pub fn money(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(error("negative", "must not be negative"));
    }
    if *value >= MONEY_LIMIT {
        return Err(error("range", "must be less than 10000000000"));
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(error("precision", "must have at most two decimal places"));
    }
    Ok(())
}

/// Accepts a percentage between 0 and 100 inclusive.
pub fn percentage(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        return Err(error("range", "must be between 0 and 100"));
    }
    Ok(())
}

/// Flattens nested `validator` errors into field/message pairs.
///
/// Nested structs become `parent.child`, list entries `items[2].quantity`.
pub fn flatten_errors(prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        let field = camel_case(field);
        let path = prefix.map_or_else(|| field.clone(), |p| format!("{p}.{field}"));
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map_or_else(|| describe_code(&err.code), ToString::to_string);
                    out.push(FieldError::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten_errors(Some(&path), inner, out),
            ValidationErrorsKind::List(entries) => {
                for (index, inner) in entries {
                    flatten_errors(Some(&format!("{path}[{index}]")), inner, out);
                }
            }
        }
    }
}

/// Validates an order header and each of its lines, reporting line failures
/// as `items[i].field`.
pub fn field_errors<H, L>(header: &H, lines: &[L]) -> Vec<FieldError>
where
    H: Validate,
    L: Validate,
{
    let mut out = Vec::new();
    if let Err(errors) = header.validate() {
        flatten_errors(None, &errors, &mut out);
    }
    for (index, line) in lines.iter().enumerate() {
        if let Err(errors) = line.validate() {
            flatten_errors(Some(&format!("items[{index}]")), &errors, &mut out);
        }
    }
    out
}

/// Struct fields are snake_case but clients send camelCase.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn describe_code(code: &str) -> String {
    match code {
        "email" => "must be a valid email address".to_string(),
        "length" => "has an invalid length".to_string(),
        "range" => "is out of range".to_string(),
        other => format!("is invalid ({other})"),
    }
}

/// Trims a string, mapping blank results to `None`.
#[must_use]
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Rounds an incoming money value to cents.
///
/// JSON numbers arrive through `f64`, so a value such as `29.99` may carry
/// representation noise beyond the second decimal place.
#[must_use]
pub fn to_cents(value: Decimal) -> Decimal {
    value.round_dp(MONEY_SCALE)
}

/// Parses either an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde adapter for optional dates in request payloads.
pub mod flexible_date {
    use super::{DateTime, Deserialize, Deserializer, Utc, parse_datetime};

    /// Deserializes `null`, an RFC 3339 timestamp, or a `YYYY-MM-DD` date.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(text) => parse_datetime(&text).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "invalid date '{text}', expected RFC 3339 or YYYY-MM-DD"
                ))
            }),
        }
    }
}

/// Deserializes a field that distinguishes "absent" from an explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "...")]`: a missing key stays
/// `None`, `null` becomes `Some(None)`, and a value becomes `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use rust_decimal_macros::dec;

    #[derive(Validate)]
    struct Line {
        #[validate(range(min = 1))]
        quantity: i32,
    }

    #[derive(Validate)]
    struct Payload {
        #[validate(custom(function = "not_blank"))]
        name: String,
        #[validate(email)]
        email: Option<String>,
        #[validate(nested)]
        items: Vec<Line>,
    }

    #[test]
    fn test_money_rules() {
        assert!(money(&dec!(0)).is_ok());
        assert!(money(&dec!(10.50)).is_ok());
        assert!(money(&dec!(10.500)).is_ok());
        assert!(money(&dec!(-0.01)).is_err());
        assert!(money(&dec!(1.005)).is_err());
        assert!(money(&dec!(9999999999.99)).is_ok());
        assert!(money(&dec!(10000000000)).is_err());
        assert!(money(&dec!(10000000000000000000000000000)).is_err());
        assert_eq!(MONEY_LIMIT, dec!(10000000000));
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(percentage(&dec!(0)).is_ok());
        assert!(percentage(&dec!(18)).is_ok());
        assert!(percentage(&dec!(100)).is_ok());
        assert!(percentage(&dec!(100.01)).is_err());
        assert!(percentage(&dec!(-1)).is_err());
    }

    #[test]
    fn test_flatten_reports_nested_paths() {
        let payload = Payload {
            name: "  ".to_string(),
            email: Some("not-an-email".to_string()),
            items: vec![Line { quantity: 1 }, Line { quantity: 0 }],
        };
        let errors = payload.validate().unwrap_err();
        let mut out = Vec::new();
        flatten_errors(None, &errors, &mut out);

        let fields: Vec<&str> = out.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "items[1].quantity", "name"]);
        assert_eq!(out[0].message, "must be a valid email address");
        assert_eq!(out[2].message, "must not be blank");
    }

    #[test]
    fn test_field_names_reported_in_camel_case() {
        assert_eq!(camel_case("unit_price"), "unitPrice");
        assert_eq!(camel_case("expected_delivery"), "expectedDelivery");
        assert_eq!(camel_case("sku"), "sku");
    }

    #[test]
    fn test_parse_datetime_accepts_both_forms() {
        let date = parse_datetime("2024-03-01").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        let ts = parse_datetime("2024-03-01T10:30:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T08:30:00+00:00");

        assert!(parse_datetime("03/01/2024").is_none());
    }

    #[test]
    fn test_clean_optional_and_cents() {
        assert_eq!(clean_optional(Some("  x ".to_string())), Some("x".to_string()));
        assert_eq!(clean_optional(Some("   ".to_string())), None);
        assert_eq!(to_cents(dec!(29.989999999)), dec!(29.99));
    }
}
