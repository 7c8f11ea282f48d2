//! Error types for market data operations.

use thiserror::Error;

/// Errors that can occur while resolving closing prices.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The symbol exists but has no close in the requested lookback window.
    #[error("No data for date range")]
    NoDataForRange,

    /// The gateway rejected the request's bearer identity token.
    #[error("Unauthorized: identity token missing or invalid")]
    Unauthorized,

    /// The gateway answered with an unexpected HTTP status.
    #[error("Gateway returned status {status}: {message}")]
    GatewayStatus { status: u16, message: String },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError { provider: String, message: String },

    /// The provider returned data that failed validation checks.
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns true when the error only means "no price for this ticker"
    /// rather than a failure of the whole lookup.
    pub fn is_missing_price(&self) -> bool {
        matches!(self, Self::SymbolNotFound(_) | Self::NoDataForRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_price_classification() {
        assert!(MarketDataError::SymbolNotFound("ZZZ".to_string()).is_missing_price());
        assert!(MarketDataError::NoDataForRange.is_missing_price());
        assert!(!MarketDataError::Unauthorized.is_missing_price());
        assert!(!MarketDataError::GatewayStatus {
            status: 500,
            message: "boom".to_string()
        }
        .is_missing_price());
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::SymbolNotFound("ZZZ".to_string());
        assert_eq!(format!("{}", error), "Symbol not found: ZZZ");

        let error = MarketDataError::GatewayStatus {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Gateway returned status 503: unavailable"
        );
    }
}
