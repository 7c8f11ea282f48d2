//! Closing-price provider trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::errors::MarketDataError;
use crate::models::ClosePrice;

/// A source of historical closing prices.
///
/// The portfolio core talks to the gateway through this trait; the gateway
/// itself implements it over an upstream market-data source. Lookups resolve
/// the most recent close in a trailing five-day window ending the day after
/// the requested date, so weekends and holidays still price.
#[async_trait]
pub trait ClosePriceProvider: Send + Sync {
    /// Resolve the closing price of one ticker as of `date`.
    ///
    /// Returns [`MarketDataError::NoDataForRange`] when the lookback window
    /// holds no close for the symbol.
    async fn close_price(&self, ticker: &str, date: NaiveDate)
        -> Result<ClosePrice, MarketDataError>;

    /// Resolve closing prices for a batch of tickers as of `date`.
    ///
    /// Tickers that could not be priced are omitted from the result; a
    /// missing price never fails the whole batch.
    async fn batch_close_prices(
        &self,
        tickers: &[String],
        date: NaiveDate,
    ) -> Result<HashMap<String, Decimal>, MarketDataError>;
}
