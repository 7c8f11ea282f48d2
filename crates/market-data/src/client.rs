//! HTTP client for the authenticated market price gateway.
//!
//! The gateway exposes two endpoints, both behind a bearer identity token:
//!
//! - `POST /close-price` with `{ ticker, date }`
//! - `POST /batch-mtm` with `{ tickerList, date }`

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{
    BatchMtmRequest, BatchMtmResponse, ClosePrice, ClosePriceRequest, ClosePriceResponse,
};
use crate::provider::ClosePriceProvider;

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Supplies the bearer identity token attached to every gateway request.
///
/// Tokens are short-lived in most deployments, so the client asks for a
/// fresh one per request instead of caching a string at construction time.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn identity_token(&self) -> Result<String, MarketDataError>;
}

/// Token provider for a fixed, pre-issued token.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn identity_token(&self) -> Result<String, MarketDataError> {
        Ok(self.token.clone())
    }
}

/// Client for the remote price gateway. Implements [`ClosePriceProvider`],
/// so the portfolio core can be wired to either the gateway or a direct
/// upstream provider without caring which.
pub struct GatewayClient {
    client: Client,
    base_url: String,
    token_provider: Arc<dyn TokenProvider>,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>, token_provider: Arc<dyn TokenProvider>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_provider,
        }
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, MarketDataError> {
        let token = self.token_provider.identity_token().await?;
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(MarketDataError::Unauthorized),
            StatusCode::NOT_FOUND => Err(MarketDataError::NoDataForRange),
            status if !status.is_success() => {
                let message = response.text().await.unwrap_or_default();
                Err(MarketDataError::GatewayStatus {
                    status: status.as_u16(),
                    message,
                })
            }
            _ => Ok(response),
        }
    }
}

#[async_trait]
impl ClosePriceProvider for GatewayClient {
    async fn close_price(
        &self,
        ticker: &str,
        date: NaiveDate,
    ) -> Result<ClosePrice, MarketDataError> {
        let request = ClosePriceRequest {
            ticker: ticker.to_string(),
            date,
        };
        let response = self.post_json("/close-price", &request).await?;
        let body: ClosePriceResponse = response.json().await?;

        if !body.success {
            return Err(MarketDataError::NoDataForRange);
        }

        Ok(ClosePrice {
            ticker: ticker.to_string(),
            requested_date: body.requested_date,
            quote_date: body.historical.date.unwrap_or(body.requested_date),
            close: body.historical.close,
        })
    }

    async fn batch_close_prices(
        &self,
        tickers: &[String],
        date: NaiveDate,
    ) -> Result<HashMap<String, Decimal>, MarketDataError> {
        let request = BatchMtmRequest {
            ticker_list: tickers.to_vec(),
            date,
        };
        let response = self.post_json("/batch-mtm", &request).await?;
        let body: BatchMtmResponse = response.json().await?;
        Ok(body.data)
    }
}
