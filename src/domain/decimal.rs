//! Exact base-10 arithmetic helpers.
//!
//! Every monetary or percentage input is converted into a [`Decimal`]
//! (96-bit mantissa, 28 significant digits) before any arithmetic happens.
//! Floats only appear at the edges: callers may hand in `f64`, and results
//! may be read back as `f64` for convenience, but no comparison or total is
//! ever computed on binary floating point.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

/// Errors converting external numbers into decimals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecimalError {
    #[error("Non-finite number cannot be represented as a decimal: {0}")]
    NonFinite(String),

    #[error("Invalid decimal literal: '{0}'")]
    Invalid(String),

    #[error("Decimal overflow computing {0}")]
    Overflow(String),
}

/// Convert a caller-supplied float into a decimal.
///
/// Uses the shortest round-trip representation of the float, so `0.1`
/// becomes exactly `0.1` rather than the binary expansion of the nearest
/// double.
pub fn from_f64(value: f64) -> Result<Decimal, DecimalError> {
    if !value.is_finite() {
        return Err(DecimalError::NonFinite(value.to_string()));
    }
    parse(&value.to_string())
}

/// Parse a decimal literal, accepting scientific notation.
pub fn parse(literal: &str) -> Result<Decimal, DecimalError> {
    let trimmed = literal.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| DecimalError::Invalid(literal.to_string()))
}

/// Parse a rate such as `"12.5%"` or `" 20 "`.
pub fn parse_rate(literal: &str) -> Result<Decimal, DecimalError> {
    let cleaned: String = literal
        .chars()
        .filter(|c| *c != '%' && !c.is_whitespace())
        .collect();
    parse(&cleaned).map_err(|_| DecimalError::Invalid(literal.to_string()))
}

/// Read a decimal out of a loosely-typed JSON value.
///
/// Integers convert exactly; other numbers go through their textual form.
/// Strings are parsed as decimal literals. Anything else is `None`.
pub fn from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                parse(&n.to_string()).ok()
            }
        }
        Value::String(s) => parse_rate(s).ok(),
        _ => None,
    }
}

/// `12.5` (percent) -> `0.125` (fraction).
#[inline]
pub fn percent_to_fraction(percent: Decimal) -> Decimal {
    percent / Decimal::ONE_HUNDRED
}

/// Round to cents, half away from zero.
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Read a decimal back as a float at the result boundary.
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}
