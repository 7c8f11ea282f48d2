use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use trackvest_core::Error as CoreError;
use trackvest_market_data::MarketDataError;

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP-facing error wrapper over the core and market-data taxonomies.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Core(err) => match err {
                CoreError::Validation(_)
                | CoreError::InsufficientFunds { .. }
                | CoreError::InsufficientPosition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                CoreError::Conflict(_) => StatusCode::CONFLICT,
                CoreError::AlreadyExists(_) => StatusCode::CONFLICT,
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::MarketData(inner) => market_data_status(inner),
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::MarketData(err) => market_data_status(err),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn market_data_status(err: &MarketDataError) -> StatusCode {
    match err {
        MarketDataError::SymbolNotFound(_) | MarketDataError::NoDataForRange => {
            StatusCode::NOT_FOUND
        }
        MarketDataError::Unauthorized => StatusCode::UNAUTHORIZED,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
