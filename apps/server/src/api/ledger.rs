use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use trackvest_core::ledger::{
    CashflowEntry, MutationOutcome, NewCashflow, NewTransaction, TransactionEntry,
};

use crate::error::ApiResult;
use crate::main_lib::AppState;

pub async fn add_cashflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<NewCashflow>,
) -> ApiResult<Json<MutationOutcome>> {
    Ok(Json(state.ledger_service.add_cashflow(&id, input).await?))
}

pub async fn list_cashflows(
    State(state): State<Arc<AppState>>,
    Path((id, year)): Path<(String, i32)>,
) -> ApiResult<Json<HashMap<String, CashflowEntry>>> {
    Ok(Json(
        state.ledger_repository.get_cashflows(&id, year).await?,
    ))
}

pub async fn add_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<NewTransaction>,
) -> ApiResult<Json<MutationOutcome>> {
    Ok(Json(
        state.ledger_service.add_transaction(&id, input).await?,
    ))
}

pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Path((id, month)): Path<(String, String)>,
) -> ApiResult<Json<HashMap<String, TransactionEntry>>> {
    Ok(Json(
        state.ledger_repository.get_transactions(&id, &month).await?,
    ))
}
