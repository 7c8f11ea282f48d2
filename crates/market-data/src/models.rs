//! Wire and domain models for closing-price lookups.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A resolved closing price for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePrice {
    pub ticker: String,
    /// The date the caller asked for.
    pub requested_date: NaiveDate,
    /// The trading day the close actually belongs to. May be earlier than
    /// `requested_date` when the market was closed on the requested day.
    pub quote_date: NaiveDate,
    pub close: Decimal,
}

/// One historical bar as the gateway reports it. Only `close` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalClose {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,
    pub close: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

/// Body of `POST /close-price`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePriceRequest {
    pub ticker: String,
    pub date: NaiveDate,
}

/// Response of `POST /close-price`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePriceResponse {
    pub success: bool,
    pub historical: HistoricalClose,
    pub requested_date: NaiveDate,
}

/// Body of `POST /batch-mtm`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMtmRequest {
    pub ticker_list: Vec<String>,
    pub date: NaiveDate,
}

/// Response of `POST /batch-mtm`. Tickers that could not be priced are
/// simply absent from `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMtmResponse {
    pub data: HashMap<String, Decimal>,
    pub requested_date: NaiveDate,
}
