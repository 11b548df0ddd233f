//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse an optional UUID column.
pub(crate) fn parse_optional_uuid(value: Option<&str>, label: &str) -> ResultEngine<Option<Uuid>> {
    value.map(|v| parse_uuid(v, label)).transpose()
}

/// Parse a decimal amount stored as text.
pub(crate) fn parse_amount(value: &str) -> ResultEngine<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|_| EngineError::InvalidAmount(format!("invalid decimal amount: {value}")))
}

/// Amounts are stored in their normalized textual form (`1.50`, not `1.500`).
pub(crate) fn amount_to_storage(amount: Decimal) -> String {
    amount.normalize().to_string()
}

/// Adds two amounts, failing instead of overflowing.
pub(crate) fn checked_add(lhs: Decimal, rhs: Decimal) -> ResultEngine<Decimal> {
    lhs.checked_add(rhs)
        .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
}

/// Sums amounts with [`checked_add`].
pub(crate) fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> ResultEngine<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, checked_add)
}

/// Trim a display name and reject empty input.
pub(crate) fn normalize_display_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed: String = value.trim().nfc().collect();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!("{label} must not be empty")));
    }
    Ok(trimmed)
}

/// Lookup key for names: compatibility-normalized and case-folded.
pub(crate) fn normalize_name_key(value: &str) -> String {
    value
        .trim()
        .nfkc()
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reject ranges whose start lies after their end.
pub(crate) fn ensure_range(start: NaiveDate, end: NaiveDate) -> ResultEngine<()> {
    if start > end {
        return Err(EngineError::InvalidRange(format!(
            "start {start} is after end {end}"
        )));
    }
    Ok(())
}
