use std::sync::Arc;

use axum::{extract::State, Json};
use trackvest_market_data::models::{
    BatchMtmRequest, BatchMtmResponse, ClosePriceRequest, ClosePriceResponse, HistoricalClose,
};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

/// Resolve one closing price. 404 when the trailing lookback window ending
/// the day after the requested date has no close for the symbol.
pub async fn close_price(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClosePriceRequest>,
) -> ApiResult<Json<ClosePriceResponse>> {
    if request.ticker.trim().is_empty() {
        return Err(ApiError::Core(
            trackvest_core::errors::ValidationError::MissingField("ticker".to_string()).into(),
        ));
    }

    let price = state
        .price_provider
        .close_price(&request.ticker, request.date)
        .await?;

    Ok(Json(ClosePriceResponse {
        success: true,
        historical: HistoricalClose {
            date: Some(price.quote_date),
            open: None,
            high: None,
            low: None,
            close: price.close,
            volume: None,
        },
        requested_date: request.date,
    }))
}

/// Resolve a batch of closing prices. Tickers that could not be priced are
/// omitted from `data` rather than failing the request.
pub async fn batch_mtm(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchMtmRequest>,
) -> ApiResult<Json<BatchMtmResponse>> {
    let data = state
        .price_provider
        .batch_close_prices(&request.ticker_list, request.date)
        .await?;

    Ok(Json(BatchMtmResponse {
        data,
        requested_date: request.date,
    }))
}
