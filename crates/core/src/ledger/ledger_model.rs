//! Ledger domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{CASHFLOW_ID_PREFIX, LEDGER_ID_PAD_WIDTH, TRANSACTION_ID_PREFIX};
use crate::portfolio::snapshot::PortfolioSummary;

/// Direction of a cashflow entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashflowType {
    In,
    Out,
}

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Why a cashflow entry exists. `cash in`/`cash out` mark externally
/// contributed capital and move `self_capital`; `buy`/`sell` are the
/// companion flows of trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CashflowReason {
    #[serde(rename = "cash in")]
    CashIn,
    #[serde(rename = "cash out")]
    CashOut,
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "sell")]
    Sell,
    #[serde(rename = "other")]
    Other,
}

impl CashflowReason {
    /// True for flows that change the owner's contributed capital.
    pub fn is_external_capital(&self) -> bool {
        matches!(self, CashflowReason::CashIn | CashflowReason::CashOut)
    }
}

/// An immutable cashflow ledger entry, keyed `cf_NNNNNN` under its
/// calendar year. Never edited or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowEntry {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub flow: CashflowType,
    /// Positive magnitude; the direction lives in `flow`.
    pub amount: Decimal,
    pub bal_prev: Decimal,
    pub bal_after: Decimal,
    pub reason: CashflowReason,
    pub time_stamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An immutable transaction ledger entry, keyed `tx_NNNNNN` under its
/// `YYYY-MM` month. Never edited or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEntry {
    pub ticker: String,
    pub asset_class: String,
    pub amount: Decimal,
    pub price: Decimal,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub time_stamp: i64,
    /// Display form of `time_stamp` in the portfolio timezone.
    pub time: String,
    pub commission: Decimal,
    pub other_fees: Decimal,
    /// Buy: `amount*price + commission + other_fees`.
    /// Sell: `amount*price - commission - other_fees` (the net proceeds).
    pub total_cost: Decimal,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Input model for recording a cashflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCashflow {
    /// Epoch millis of the entry.
    pub time: i64,
    #[serde(rename = "type")]
    pub flow: CashflowType,
    pub amount: Decimal,
    pub reason: CashflowReason,
    #[serde(default)]
    pub note: Option<String>,
    /// Client-generated key deduplicating re-submissions of the same
    /// mutation. A replay returns the originally minted entry id.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// Input model for recording a buy or sell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// Epoch millis of the trade.
    pub time: i64,
    pub ticker: String,
    #[serde(default = "default_asset_class")]
    pub asset_class: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub amount: Decimal,
    /// Fill price; also the provisional mark until the next MTM refresh.
    pub price: Decimal,
    #[serde(default)]
    pub commission: Decimal,
    #[serde(default)]
    pub other_fees: Decimal,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

fn default_asset_class() -> String {
    "stock".to_string()
}

/// What a ledger mutation handed back to its caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    /// The minted (or, on an idempotent replay, previously minted) entry id.
    pub entry_id: String,
    pub duplicate: bool,
    /// The summary as persisted by the mutation, before the best-effort
    /// valuation refresh.
    pub summary: PortfolioSummary,
}

/// Mints the next cashflow id from a sequence count, e.g. `cf_000001`.
pub fn mint_cashflow_id(count: u64) -> String {
    format!(
        "{}{:0width$}",
        CASHFLOW_ID_PREFIX,
        count,
        width = LEDGER_ID_PAD_WIDTH
    )
}

/// Mints the next transaction id from a sequence count, e.g. `tx_000001`.
pub fn mint_transaction_id(count: u64) -> String {
    format!(
        "{}{:0width$}",
        TRANSACTION_ID_PREFIX,
        count,
        width = LEDGER_ID_PAD_WIDTH
    )
}
