// Test cases for the mark-to-market engine.

#[cfg(test)]
mod tests {
    use crate::errors::{Error, Result};
    use crate::portfolio::snapshot::{PortfolioSummary, SinglePosition, SummaryRepositoryTrait};
    use crate::portfolio::valuation::{ValuationService, ValuationServiceTrait};
    use crate::utils::time_utils::{local_midnight_millis, DEFAULT_PORTFOLIO_TZ};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use trackvest_market_data::provider::ClosePriceProvider;
    use trackvest_market_data::{ClosePrice, MarketDataError};

    struct MockSummaryRepository {
        summary: Mutex<PortfolioSummary>,
        save_count: Mutex<u32>,
    }

    impl MockSummaryRepository {
        fn new(summary: PortfolioSummary) -> Self {
            Self {
                summary: Mutex::new(summary),
                save_count: Mutex::new(0),
            }
        }

        fn saves(&self) -> u32 {
            *self.save_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl SummaryRepositoryTrait for MockSummaryRepository {
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
            *self.save_count.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct MockPriceProvider {
        prices: HashMap<String, Decimal>,
        fail_on_purpose: bool,
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
            if self.fail_on_purpose {
                return Err(MarketDataError::GatewayStatus {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
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

    fn seeded_summary() -> PortfolioSummary {
        let mut summary = PortfolioSummary {
            cash_balance: dec!(5000),
            ..Default::default()
        };
        summary.current_positions.insert(
            "ABC".to_string(),
            SinglePosition::open("ABC", "stock", dec!(10), dec!(100), dec!(1000)),
        );
        summary.current_positions.insert(
            "XYZ".to_string(),
            SinglePosition::open("XYZ", "fund", dec!(4), dec!(50), dec!(200)),
        );
        summary.recompute_aggregates();
        summary
    }

    fn build(
        summary: PortfolioSummary,
        prices: HashMap<String, Decimal>,
        fail_on_purpose: bool,
    ) -> (Arc<MockSummaryRepository>, ValuationService) {
        let repository = Arc::new(MockSummaryRepository::new(summary));
        let provider = Arc::new(MockPriceProvider {
            prices,
            fail_on_purpose,
        });
        let service = ValuationService::new(repository.clone(), provider);
        (repository, service)
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 28).unwrap()
    }

    #[tokio::test]
    async fn test_mtm_updates_marks_and_aggregates() {
        let mut prices = HashMap::new();
        prices.insert("ABC".to_string(), dec!(110));
        prices.insert("XYZ".to_string(), dec!(40));
        let (repository, service) = build(seeded_summary(), prices, false);

        service.portfolio_mtm_update("p1", as_of()).await.unwrap();

        let summary = repository.get("p1").await.unwrap();
        let abc = summary.current_positions.get("ABC").unwrap();
        assert_eq!(abc.market_price, dec!(110));
        assert_eq!(abc.market_value, dec!(1100));
        assert_eq!(abc.pnl, dec!(100));
        assert_eq!(abc.pnl_pct, "10.00%");

        let xyz = summary.current_positions.get("XYZ").unwrap();
        assert_eq!(xyz.market_value, dec!(160));
        assert_eq!(xyz.pnl, dec!(-40));
        assert_eq!(xyz.pnl_pct, "-20.00%");

        // positionValue equals the sum of market values, netWorth follows.
        assert_eq!(summary.position_value, dec!(1260));
        assert_eq!(summary.net_worth, dec!(6260));
        assert_eq!(
            summary.mtm_time_stamp,
            local_midnight_millis(as_of(), DEFAULT_PORTFOLIO_TZ)
        );
    }

    #[tokio::test]
    async fn test_unpriced_ticker_keeps_its_stale_mark() {
        let mut prices = HashMap::new();
        prices.insert("ABC".to_string(), dec!(110));
        let (repository, service) = build(seeded_summary(), prices, false);

        service.portfolio_mtm_update("p1", as_of()).await.unwrap();

        let summary = repository.get("p1").await.unwrap();
        let xyz = summary.current_positions.get("XYZ").unwrap();
        assert_eq!(xyz.market_price, dec!(50));
        assert_eq!(xyz.market_value, dec!(200));
        // The aggregate still folds the stale mark in.
        assert_eq!(summary.position_value, dec!(1100) + dec!(200));
    }

    #[tokio::test]
    async fn test_total_gateway_failure_abandons_the_update() {
        let (repository, service) = build(seeded_summary(), HashMap::new(), true);

        let before = repository.get("p1").await.unwrap();
        let result = service.portfolio_mtm_update("p1", as_of()).await;
        assert!(result.is_ok());

        let after = repository.get("p1").await.unwrap();
        assert_eq!(before, after);
        assert_eq!(repository.saves(), 0);
    }

    #[tokio::test]
    async fn test_empty_portfolio_is_a_no_op() {
        let (repository, service) = build(PortfolioSummary::default(), HashMap::new(), false);
        service.portfolio_mtm_update("p1", as_of()).await.unwrap();
        assert_eq!(repository.saves(), 0);
    }

    #[tokio::test]
    async fn test_mark_to_market_omits_failed_tickers() {
        let mut prices = HashMap::new();
        prices.insert("ABC".to_string(), dec!(110));
        let (_repository, service) = build(seeded_summary(), prices, false);

        let resolved = service
            .mark_to_market(&["ABC".to_string(), "XYZ".to_string()], as_of())
            .await
            .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.get("ABC"), Some(&dec!(110)));
        assert!(!resolved.contains_key("XYZ"));
    }
}
