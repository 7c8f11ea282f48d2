use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use trackvest_core::portfolio::snapshot::PortfolioSummary;
use trackvest_core::portfolio::{NewPortfolio, Portfolio};

use crate::error::ApiResult;
use crate::main_lib::AppState;

pub async fn create_portfolio(
    State(state): State<Arc<AppState>>,
    Json(new_portfolio): Json<NewPortfolio>,
) -> ApiResult<Json<Portfolio>> {
    let portfolio = state
        .portfolio_service
        .create_portfolio(new_portfolio)
        .await?;
    Ok(Json(portfolio))
}

#[derive(serde::Deserialize)]
pub struct ListPortfoliosQuery {
    owner: String,
}

pub async fn list_portfolios(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPortfoliosQuery>,
) -> ApiResult<Json<Vec<Portfolio>>> {
    Ok(Json(
        state.portfolio_service.list_portfolios(&query.owner).await?,
    ))
}

pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Portfolio>> {
    Ok(Json(state.portfolio_service.get_portfolio(&id).await?))
}

pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PortfolioSummary>> {
    Ok(Json(state.portfolio_service.get_summary(&id).await?))
}

pub async fn list_statements(
    State(state): State<Arc<AppState>>,
    Path((id, year)): Path<(String, i32)>,
) -> ApiResult<Json<HashMap<String, PortfolioSummary>>> {
    Ok(Json(
        state.statement_repository.get_year(&id, year).await?,
    ))
}
