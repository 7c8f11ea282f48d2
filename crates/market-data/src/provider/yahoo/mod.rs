//! Yahoo Finance closing-price provider.
//!
//! Used by the gateway to resolve `close-price` and `batch-mtm` lookups.
//! Prices come from the daily history endpoint; a request for date D scans
//! the trailing five-day window ending at D+1 and takes the latest close,
//! so weekends and market holidays resolve to the prior trading day.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use futures::future::join_all;
use log::warn;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::ClosePrice;
use crate::provider::ClosePriceProvider;

const PROVIDER_ID: &str = "YAHOO";

/// Number of calendar days scanned backwards for the latest close.
const LOOKBACK_DAYS: i64 = 5;

pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to initialize Yahoo connector: {}", e),
            })?;
        Ok(Self { connector })
    }

    /// Convert a domain date to the `time::OffsetDateTime` the Yahoo API wants.
    fn offset_datetime_at(date: NaiveDate) -> OffsetDateTime {
        let instant = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        OffsetDateTime::from_unix_timestamp(instant.timestamp())
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
    }

    fn map_yahoo_error(ticker: &str, err: yahoo::YahooError) -> MarketDataError {
        match err {
            yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult => {
                MarketDataError::SymbolNotFound(ticker.to_string())
            }
            other => MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[async_trait]
impl ClosePriceProvider for YahooProvider {
    async fn close_price(
        &self,
        ticker: &str,
        date: NaiveDate,
    ) -> Result<ClosePrice, MarketDataError> {
        let window_end = date + Duration::days(1);
        let window_start = window_end - Duration::days(LOOKBACK_DAYS);

        let response = self
            .connector
            .get_quote_history(
                ticker,
                Self::offset_datetime_at(window_start),
                Self::offset_datetime_at(window_end),
            )
            .await
            .map_err(|e| Self::map_yahoo_error(ticker, e))?;

        let quotes = response
            .quotes()
            .map_err(|e| Self::map_yahoo_error(ticker, e))?;

        // History comes back in ascending timestamp order; the last bar in
        // the window is the close we want.
        let latest = quotes.last().ok_or(MarketDataError::NoDataForRange)?;

        let close = Decimal::from_f64(latest.close).ok_or_else(|| {
            MarketDataError::ValidationFailed {
                message: format!("Failed to convert close price {} to Decimal", latest.close),
            }
        })?;

        let quote_date = Utc
            .timestamp_opt(latest.timestamp as i64, 0)
            .single()
            .map(|ts| ts.date_naive())
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!("Invalid timestamp: {}", latest.timestamp),
            })?;

        Ok(ClosePrice {
            ticker: ticker.to_string(),
            requested_date: date,
            quote_date,
            close,
        })
    }

    async fn batch_close_prices(
        &self,
        tickers: &[String],
        date: NaiveDate,
    ) -> Result<HashMap<String, Decimal>, MarketDataError> {
        let lookups = tickers.iter().map(|ticker| async move {
            (ticker.clone(), self.close_price(ticker, date).await)
        });

        let mut prices = HashMap::new();
        for (ticker, outcome) in join_all(lookups).await {
            match outcome {
                Ok(price) => {
                    prices.insert(ticker, price.close);
                }
                Err(e) => {
                    warn!("Skipping {} in batch mark as of {}: {}", ticker, date, e);
                }
            }
        }
        Ok(prices)
    }
}
