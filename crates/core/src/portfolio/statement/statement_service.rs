use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use log::{debug, warn};
use std::sync::Arc;

use crate::errors::Result;
use crate::portfolio::snapshot::{StatementRepositoryTrait, SummaryRepositoryTrait};
use crate::portfolio::statement::StatementServiceTrait;
use crate::portfolio::valuation::ValuationServiceTrait;
use crate::utils::time_utils::{
    end_of_month_millis, local_midnight_millis, month_end_date, month_end_of, month_key,
    DEFAULT_PORTFOLIO_TZ,
};

/// Freezes end-of-month statements when a new entry crosses the month
/// boundary of the mark-to-market watermark.
pub struct StatementService {
    summary_repository: Arc<dyn SummaryRepositoryTrait>,
    statement_repository: Arc<dyn StatementRepositoryTrait>,
    valuation_service: Arc<dyn ValuationServiceTrait>,
    tz: Tz,
    backfill_skipped_months: bool,
}

impl StatementService {
    pub fn new(
        summary_repository: Arc<dyn SummaryRepositoryTrait>,
        statement_repository: Arc<dyn StatementRepositoryTrait>,
        valuation_service: Arc<dyn ValuationServiceTrait>,
    ) -> Self {
        Self {
            summary_repository,
            statement_repository,
            valuation_service,
            tz: DEFAULT_PORTFOLIO_TZ,
            backfill_skipped_months: false,
        }
    }

    /// Overrides the portfolio timezone used for month boundaries.
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// When enabled, every completed month between the watermark and the
    /// new entry gets its own statement instead of only the watermark's
    /// month.
    pub fn with_backfill(mut self, backfill_skipped_months: bool) -> Self {
        self.backfill_skipped_months = backfill_skipped_months;
        self
    }

    /// Final valuation for the closing month, then a verbatim freeze of the
    /// finalized summary under its `YYYY-MM` key.
    async fn freeze_month(&self, portfolio_id: &str, closing_day: NaiveDate) -> Result<()> {
        let key = month_key(closing_day);

        self.valuation_service
            .portfolio_mtm_update(portfolio_id, closing_day)
            .await?;

        let snapshot = self.summary_repository.get(portfolio_id).await?;
        let frozen = self
            .statement_repository
            .put_if_absent(portfolio_id, &key, &snapshot)
            .await?;

        if frozen {
            debug!(
                "Monthly statement {} frozen for portfolio {}",
                key, portfolio_id
            );
        } else {
            warn!(
                "Monthly statement {} already exists for portfolio {}, leaving it untouched",
                key, portfolio_id
            );
        }
        Ok(())
    }

    /// End-of-month instant (epoch millis) of the month holding `closing_day`.
    fn month_end_instant(&self, closing_day: NaiveDate) -> i64 {
        local_midnight_millis(closing_day + Duration::days(1), self.tz) - 1
    }
}

#[async_trait]
impl StatementServiceTrait for StatementService {
    async fn create_monthly_statement_if_needed(
        &self,
        portfolio_id: &str,
        new_entry_time: i64,
    ) -> Result<()> {
        let summary = self.summary_repository.get(portfolio_id).await?;
        if summary.mtm_time_stamp <= 0 {
            // Fresh portfolio: nothing has been marked yet, nothing to freeze.
            return Ok(());
        }

        let month_end = end_of_month_millis(summary.mtm_time_stamp, self.tz);
        if new_entry_time < month_end {
            // Still inside the watermark's month.
            return Ok(());
        }

        let mut closing_day = month_end_date(summary.mtm_time_stamp, self.tz);
        loop {
            self.freeze_month(portfolio_id, closing_day).await?;

            if !self.backfill_skipped_months {
                break;
            }
            let next_closing_day = month_end_of(closing_day + Duration::days(1));
            if new_entry_time < self.month_end_instant(next_closing_day) {
                break;
            }
            closing_day = next_closing_day;
        }
        Ok(())
    }
}
