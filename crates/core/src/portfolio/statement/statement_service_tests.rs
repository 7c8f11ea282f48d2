// Test cases for the monthly statement snapshotter.

#[cfg(test)]
mod tests {
    use crate::errors::{Error, Result};
    use crate::portfolio::snapshot::{
        PortfolioSummary, SinglePosition, StatementRepositoryTrait, SummaryRepositoryTrait,
    };
    use crate::portfolio::statement::{StatementService, StatementServiceTrait};
    use crate::portfolio::valuation::ValuationService;
    use crate::utils::time_utils::{local_midnight_millis, DEFAULT_PORTFOLIO_TZ};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use trackvest_market_data::provider::ClosePriceProvider;
    use trackvest_market_data::{ClosePrice, MarketDataError};

    struct MockStore {
        summary: Mutex<PortfolioSummary>,
        statements: Mutex<HashMap<String, PortfolioSummary>>,
    }

    impl MockStore {
        fn new(summary: PortfolioSummary) -> Self {
            Self {
                summary: Mutex::new(summary),
                statements: Mutex::new(HashMap::new()),
            }
        }

        fn statement(&self, month_key: &str) -> Option<PortfolioSummary> {
            self.statements.lock().unwrap().get(month_key).cloned()
        }

        fn statement_count(&self) -> usize {
            self.statements.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SummaryRepositoryTrait for MockStore {
        async fn get(&self, _portfolio_id: &str) -> Result<PortfolioSummary> {
            Ok(self.summary.lock().unwrap().clone())
        }

        async fn save(&self, _portfolio_id: &str, summary: &PortfolioSummary) -> Result<()> {
            let mut stored = self.summary.lock().unwrap();
            if stored.version != summary.version {
                return Err(Error::Conflict("stale summary".to_string()));
            }
            *stored = summary.clone();
            stored.version += 1;
            Ok(())
        }
    }

    #[async_trait]
    impl StatementRepositoryTrait for MockStore {
        async fn put_if_absent(
            &self,
            _portfolio_id: &str,
            month_key: &str,
            snapshot: &PortfolioSummary,
        ) -> Result<bool> {
            let mut statements = self.statements.lock().unwrap();
            if statements.contains_key(month_key) {
                return Ok(false);
            }
            statements.insert(month_key.to_string(), snapshot.clone());
            Ok(true)
        }

        async fn get_year(
            &self,
            _portfolio_id: &str,
            year: i32,
        ) -> Result<HashMap<String, PortfolioSummary>> {
            let prefix = format!("{}-", year);
            Ok(self
                .statements
                .lock()
                .unwrap()
                .iter()
                .filter(|(key, _)| key.starts_with(&prefix))
                .map(|(key, snapshot)| (key.clone(), snapshot.clone()))
                .collect())
        }
    }

    struct MockPriceProvider {
        prices: HashMap<String, Decimal>,
    }

    #[async_trait]
    impl ClosePriceProvider for MockPriceProvider {
        async fn close_price(
            &self,
            ticker: &str,
            date: NaiveDate,
        ) -> std::result::Result<ClosePrice, MarketDataError> {
            self.prices
                .get(ticker)
                .map(|close| ClosePrice {
                    ticker: ticker.to_string(),
                    requested_date: date,
                    quote_date: date,
                    close: *close,
                })
                .ok_or(MarketDataError::NoDataForRange)
        }

        async fn batch_close_prices(
            &self,
            tickers: &[String],
            _date: NaiveDate,
        ) -> std::result::Result<HashMap<String, Decimal>, MarketDataError> {
            Ok(tickers
                .iter()
                .filter_map(|ticker| {
                    self.prices
                        .get(ticker)
                        .map(|close| (ticker.clone(), *close))
                })
                .collect())
        }
    }

    fn millis_of(y: i32, m: u32, d: u32, h: u32) -> i64 {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        local_midnight_millis(date, DEFAULT_PORTFOLIO_TZ) + i64::from(h) * 3_600_000
    }

    fn seeded_summary(watermark: i64) -> PortfolioSummary {
        let mut summary = PortfolioSummary {
            cash_balance: dec!(9000),
            mtm_time_stamp: watermark,
            ..Default::default()
        };
        summary.current_positions.insert(
            "ABC".to_string(),
            SinglePosition::open("ABC", "stock", dec!(10), dec!(100), dec!(1000)),
        );
        summary.recompute_aggregates();
        summary
    }

    fn build(summary: PortfolioSummary, backfill: bool) -> (Arc<MockStore>, StatementService) {
        let store = Arc::new(MockStore::new(summary));
        let mut prices = HashMap::new();
        prices.insert("ABC".to_string(), dec!(110));
        let provider = Arc::new(MockPriceProvider { prices });
        let summary_repo: Arc<dyn SummaryRepositoryTrait> = store.clone();
        let valuation = Arc::new(ValuationService::new(summary_repo.clone(), provider));
        let service = StatementService::new(summary_repo, store.clone(), valuation)
            .with_backfill(backfill);
        (store, service)
    }

    #[tokio::test]
    async fn test_entry_inside_current_month_is_a_no_op() {
        let (store, service) = build(seeded_summary(millis_of(2024, 1, 10, 10)), false);
        service
            .create_monthly_statement_if_needed("p1", millis_of(2024, 1, 20, 10))
            .await
            .unwrap();
        assert_eq!(store.statement_count(), 0);
    }

    #[tokio::test]
    async fn test_fresh_portfolio_has_nothing_to_freeze() {
        let (store, service) = build(PortfolioSummary::default(), false);
        service
            .create_monthly_statement_if_needed("p1", millis_of(2024, 1, 20, 10))
            .await
            .unwrap();
        assert_eq!(store.statement_count(), 0);
    }

    #[tokio::test]
    async fn test_rollover_freezes_watermark_month_at_month_end_valuation() {
        let (store, service) = build(seeded_summary(millis_of(2024, 1, 10, 10)), false);
        service
            .create_monthly_statement_if_needed("p1", millis_of(2024, 2, 3, 9))
            .await
            .unwrap();

        let january = store.statement("2024-01").expect("statement must exist");
        let position = january.current_positions.get("ABC").unwrap();
        // Final valuation for the closing month uses the month-end price.
        assert_eq!(position.market_price, dec!(110));
        assert_eq!(january.position_value, dec!(1100));
        assert_eq!(january.net_worth, dec!(10100));
        assert_eq!(
            january.mtm_time_stamp,
            local_midnight_millis(
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
                DEFAULT_PORTFOLIO_TZ
            )
        );

        // The live summary was re-marked by the same final valuation.
        let summary = SummaryRepositoryTrait::get(store.as_ref(), "p1")
            .await
            .unwrap();
        assert_eq!(summary.position_value, dec!(1100));
    }

    #[tokio::test]
    async fn test_existing_statement_is_left_untouched() {
        let (store, service) = build(seeded_summary(millis_of(2024, 1, 10, 10)), false);

        let mut already_frozen = PortfolioSummary::default();
        already_frozen.cash_balance = dec!(123);
        store
            .put_if_absent("p1", "2024-01", &already_frozen)
            .await
            .unwrap();

        service
            .create_monthly_statement_if_needed("p1", millis_of(2024, 2, 3, 9))
            .await
            .unwrap();

        let january = store.statement("2024-01").unwrap();
        assert_eq!(january.cash_balance, dec!(123));
        assert_eq!(store.statement_count(), 1);
    }

    #[tokio::test]
    async fn test_skipped_months_freeze_only_watermark_month_by_default() {
        let (store, service) = build(seeded_summary(millis_of(2024, 1, 10, 10)), false);
        service
            .create_monthly_statement_if_needed("p1", millis_of(2024, 4, 10, 9))
            .await
            .unwrap();

        assert_eq!(store.statement_count(), 1);
        assert!(store.statement("2024-01").is_some());
    }

    #[tokio::test]
    async fn test_backfill_freezes_every_completed_month() {
        let (store, service) = build(seeded_summary(millis_of(2024, 1, 10, 10)), true);
        service
            .create_monthly_statement_if_needed("p1", millis_of(2024, 4, 10, 9))
            .await
            .unwrap();

        assert_eq!(store.statement_count(), 3);
        assert!(store.statement("2024-01").is_some());
        assert!(store.statement("2024-02").is_some());
        assert!(store.statement("2024-03").is_some());
        // April is still open and must not be frozen.
        assert!(store.statement("2024-04").is_none());
    }
}
