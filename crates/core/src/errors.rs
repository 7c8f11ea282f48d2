//! Core error types for the Trackvest application.
//!
//! This module defines store-agnostic error types. Storage-specific errors
//! are converted to these types by the storage layer.

use chrono::ParseError as ChronoParseError;
use rust_decimal::Decimal;
use thiserror::Error;

use trackvest_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the portfolio core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A withdrawal or buy would overdraw the cash balance.
    /// Rejected before any write.
    #[error("Insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    /// A sell asks for more units than the position holds.
    /// Rejected before any write.
    #[error("Insufficient position for {ticker}: requested {requested}, held {held}")]
    InsufficientPosition {
        ticker: String,
        requested: Decimal,
        held: Decimal,
    },

    /// A price lookup failed. Never fatal to the triggering mutation; the
    /// summary keeps its stale marks until the next refresh.
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    /// The optimistic-concurrency check on the summary failed.
    /// Retryable: re-read and re-apply.
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    /// A document write failed. Surfaced to the caller; other documents
    /// written by the same operation are not rolled back.
    #[error("Persistence operation failed: {0}")]
    Persistence(String),

    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Validation errors for user input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
