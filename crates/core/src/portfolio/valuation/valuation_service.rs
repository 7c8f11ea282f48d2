use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use log::{debug, error, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::portfolio::snapshot::SummaryRepositoryTrait;
use crate::portfolio::valuation::ValuationServiceTrait;
use crate::utils::time_utils::{local_midnight_millis, DEFAULT_PORTFOLIO_TZ};
use trackvest_market_data::provider::ClosePriceProvider;

/// Mark-to-market engine over the price gateway.
pub struct ValuationService {
    summary_repository: Arc<dyn SummaryRepositoryTrait>,
    price_provider: Arc<dyn ClosePriceProvider>,
    tz: Tz,
}

impl ValuationService {
    pub fn new(
        summary_repository: Arc<dyn SummaryRepositoryTrait>,
        price_provider: Arc<dyn ClosePriceProvider>,
    ) -> Self {
        Self {
            summary_repository,
            price_provider,
            tz: DEFAULT_PORTFOLIO_TZ,
        }
    }

    /// Overrides the portfolio timezone used to stamp the watermark.
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }
}

#[async_trait]
impl ValuationServiceTrait for ValuationService {
    async fn mark_to_market(
        &self,
        tickers: &[String],
        as_of: NaiveDate,
    ) -> Result<HashMap<String, Decimal>> {
        let prices = self.price_provider.batch_close_prices(tickers, as_of).await?;
        for ticker in tickers {
            if !prices.contains_key(ticker) {
                warn!("No market price found for {} as of {}", ticker, as_of);
            }
        }
        Ok(prices)
    }

    async fn portfolio_mtm_update(&self, portfolio_id: &str, as_of: NaiveDate) -> Result<()> {
        let mut summary = self.summary_repository.get(portfolio_id).await?;
        if summary.current_positions.is_empty() {
            debug!("No positions to update for portfolio {}", portfolio_id);
            return Ok(());
        }

        let tickers: Vec<String> = summary.current_positions.keys().cloned().collect();
        let prices = match self.mark_to_market(&tickers, as_of).await {
            Ok(prices) => prices,
            Err(e) => {
                // Stale marks are accepted; the triggering mutation stands.
                error!(
                    "Mark-to-market failed for portfolio {} as of {}: {}",
                    portfolio_id, as_of, e
                );
                return Ok(());
            }
        };

        for (ticker, position) in summary.current_positions.iter_mut() {
            if let Some(price) = prices.get(ticker) {
                position.apply_mark(*price);
            }
        }

        summary.recompute_aggregates();
        summary.mtm_time_stamp = local_midnight_millis(as_of, self.tz);
        self.summary_repository.save(portfolio_id, &summary).await?;

        debug!(
            "Portfolio {} marked to market as of {}: positionValue={}, netWorth={}",
            portfolio_id, as_of, summary.position_value, summary.net_worth
        );
        Ok(())
    }
}
