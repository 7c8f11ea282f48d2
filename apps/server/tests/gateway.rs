//! Drives the gateway endpoints through the real HTTP client used by
//! core embedders that run away from the price source.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use trackvest_market_data::provider::ClosePriceProvider;
use trackvest_market_data::{
    ClosePrice, GatewayClient, MarketDataError, StaticTokenProvider,
};
use trackvest_server::{api::app_router, build_state_with_provider, config::Config, AppState};

struct FixedPriceProvider {
    prices: HashMap<String, Decimal>,
}

#[async_trait]
impl ClosePriceProvider for FixedPriceProvider {
    async fn close_price(
        &self,
        ticker: &str,
        date: NaiveDate,
    ) -> Result<ClosePrice, MarketDataError> {
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
    ) -> Result<HashMap<String, Decimal>, MarketDataError> {
        Ok(tickers
            .iter()
            .filter_map(|ticker| self.prices.get(ticker).map(|close| (ticker.clone(), *close)))
            .collect())
    }
}

/// Binds the router on an ephemeral port and returns its base URL.
async fn spawn_gateway() -> (String, Arc<AppState>) {
    let config = Config {
        listen_addr: "127.0.0.1:0".to_string(),
        auth_secret: "test-secret".to_string(),
        portfolio_tz: chrono_tz::Australia::Sydney,
        backfill_statements: false,
    };
    let mut prices = HashMap::new();
    prices.insert("ABC".to_string(), dec!(101.25));
    prices.insert("XYZ".to_string(), dec!(42));
    let state = build_state_with_provider(&config, Arc::new(FixedPriceProvider { prices }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}", addr), state)
}

#[tokio::test]
async fn gateway_client_resolves_single_close() {
    let (base_url, state) = spawn_gateway().await;
    let token = state.auth.issue_token("tester", 3600).unwrap();
    let client = GatewayClient::new(base_url, Arc::new(StaticTokenProvider::new(token)));

    let date = NaiveDate::from_ymd_opt(2024, 3, 28).unwrap();
    let price = client.close_price("ABC", date).await.unwrap();
    assert_eq!(price.close, dec!(101.25));
    assert_eq!(price.requested_date, date);
}

#[tokio::test]
async fn gateway_client_maps_missing_data_to_no_data_for_range() {
    let (base_url, state) = spawn_gateway().await;
    let token = state.auth.issue_token("tester", 3600).unwrap();
    let client = GatewayClient::new(base_url, Arc::new(StaticTokenProvider::new(token)));

    let date = NaiveDate::from_ymd_opt(2024, 3, 28).unwrap();
    let result = client.close_price("ZZZ", date).await;
    assert!(matches!(result, Err(MarketDataError::NoDataForRange)));
}

#[tokio::test]
async fn gateway_client_maps_bad_token_to_unauthorized() {
    let (base_url, _state) = spawn_gateway().await;
    let client = GatewayClient::new(
        base_url,
        Arc::new(StaticTokenProvider::new("not-a-token")),
    );

    let date = NaiveDate::from_ymd_opt(2024, 3, 28).unwrap();
    let result = client.close_price("ABC", date).await;
    assert!(matches!(result, Err(MarketDataError::Unauthorized)));
}

#[tokio::test]
async fn gateway_client_batch_omits_failed_tickers() {
    let (base_url, state) = spawn_gateway().await;
    let token = state.auth.issue_token("tester", 3600).unwrap();
    let client = GatewayClient::new(base_url, Arc::new(StaticTokenProvider::new(token)));

    let date = NaiveDate::from_ymd_opt(2024, 3, 28).unwrap();
    let prices = client
        .batch_close_prices(
            &["ABC".to_string(), "XYZ".to_string(), "ZZZ".to_string()],
            date,
        )
        .await
        .unwrap();
    assert_eq!(prices.len(), 2);
    assert_eq!(prices.get("ABC"), Some(&dec!(101.25)));
    assert_eq!(prices.get("XYZ"), Some(&dec!(42)));
    assert!(!prices.contains_key("ZZZ"));
}
