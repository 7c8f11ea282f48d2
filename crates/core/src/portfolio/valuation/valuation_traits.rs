use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::errors::Result;

/// Trait defining the contract for mark-to-market operations.
#[async_trait]
pub trait ValuationServiceTrait: Send + Sync {
    /// Resolves closing prices for a batch of tickers as of a date.
    /// Tickers the gateway could not price are absent from the map; a
    /// missing price never fails the batch.
    async fn mark_to_market(
        &self,
        tickers: &[String],
        as_of: NaiveDate,
    ) -> Result<HashMap<String, Decimal>>;

    /// Re-marks every open position of a portfolio as of `as_of`, recomputes
    /// the summary aggregates, and persists the full snapshot in one write.
    ///
    /// A total gateway failure abandons the update (logged, not surfaced);
    /// the caller's originating mutation is never rolled back. Persistence
    /// failures propagate.
    async fn portfolio_mtm_update(&self, portfolio_id: &str, as_of: NaiveDate) -> Result<()>;
}
