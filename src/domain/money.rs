//! Decimal helpers for monetary amounts stored as integer cents.
//!
//! Amounts persist as `*_cents` integers while rates, multipliers, and
//! proportions persist as decimal text. Intermediate arithmetic uses
//! [`Decimal`] with two-place truncation, matching the fixed-scale behaviour
//! the finance team reconciles against.

use rust_decimal::prelude::*;

use crate::domain::types::TypeConstraintError;

/// Scale of every stored monetary value.
pub const MONEY_SCALE: u32 = 2;

/// Converts integer cents into a two-place decimal.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_SCALE)
}

/// Largest amount accepted from users and statement files, in cents
/// (R$ 1 trilhão).
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000_000;

/// Largest quantity accepted on a work order item.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Converts a decimal amount into integer cents, truncating extra places.
///
/// Fails when the amount does not fit an `i64` of cents.
pub fn to_cents(amount: Decimal) -> Result<i64, TypeConstraintError> {
    truncate(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| TypeConstraintError::InvalidValue(format!("amount out of range: {amount}")))
}

/// Accepts `amount` when its magnitude is at most [`MAX_AMOUNT_CENTS`].
pub fn ensure_amount(amount: Decimal) -> Result<Decimal, TypeConstraintError> {
    if amount.abs() <= from_cents(MAX_AMOUNT_CENTS) {
        Ok(amount)
    } else {
        Err(TypeConstraintError::InvalidValue(format!(
            "amount out of range: {amount}"
        )))
    }
}

/// Drops digits beyond the money scale without rounding.
pub fn truncate(amount: Decimal) -> Decimal {
    truncate_to(amount, MONEY_SCALE)
}

/// Drops digits beyond `scale` places without rounding.
pub fn truncate_to(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, RoundingStrategy::ToZero)
}

/// `a * b` truncated to two places.
///
/// Saturates at the decimal range; [`to_cents`] rejects such results before
/// they are stored.
pub fn mul(a: Decimal, b: Decimal) -> Decimal {
    truncate(a.saturating_mul(b))
}

/// `a / b` truncated to `scale` places; division by zero yields zero.
pub fn div(a: Decimal, b: Decimal, scale: u32) -> Decimal {
    if b.is_zero() {
        return Decimal::ZERO;
    }
    truncate_to(a / b, scale)
}

/// Converts a percentage (e.g. `10` for 10%) into a six-place factor.
pub fn percent_factor(percent: Decimal) -> Decimal {
    div(percent, Decimal::ONE_HUNDRED, 6)
}

/// Parses decimal text as stored in the database.
pub fn parse_decimal(value: &str) -> Result<Decimal, TypeConstraintError> {
    Decimal::from_str(value.trim())
        .map_err(|_| TypeConstraintError::InvalidDecimal(value.to_string()))
}
