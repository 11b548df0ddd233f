//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when an item is not found or not owned by the user.
//! - [`ExistingKey`] thrown when an item for the same key is already present.
//! - [`InvalidAmount`] thrown when a decimal amount cannot be parsed or is
//!   rejected.
//! - [`InvalidPeriod`] thrown when a repeat frequency label is unknown.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidPeriod`]: EngineError::InvalidPeriod
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    KeyNotFound(String),
    #[error("{0}")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidPeriod(a), Self::InvalidPeriod(b)) => a == b,
            (Self::InvalidRange(a), Self::InvalidRange(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_compares_variant_and_message() {
        assert_eq!(
            EngineError::KeyNotFound("budget".to_string()),
            EngineError::KeyNotFound("budget".to_string())
        );
        assert_ne!(
            EngineError::KeyNotFound("budget".to_string()),
            EngineError::ExistingKey("budget".to_string())
        );
    }

    #[test]
    fn lookup_messages_display_verbatim() {
        let err = EngineError::ExistingKey("There already is an entry for these parameters.".into());
        assert_eq!(
            err.to_string(),
            "There already is an entry for these parameters."
        );
        assert_eq!(
            EngineError::KeyNotFound("No such budget.".into()).to_string(),
            "No such budget."
        );
    }
}
