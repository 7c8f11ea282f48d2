//! Ledger repository and service traits.

use async_trait::async_trait;
use std::collections::HashMap;

use super::ledger_model::{
    CashflowEntry, MutationOutcome, NewCashflow, NewTransaction, TransactionEntry,
};
use crate::errors::Result;
use crate::portfolio::snapshot::PortfolioSummary;

/// A cashflow entry placed under its calendar-year ledger document.
#[derive(Debug, Clone)]
pub struct CashflowAppend {
    pub entry_id: String,
    pub year: i32,
    pub entry: CashflowEntry,
}

/// A transaction entry placed under its `YYYY-MM` ledger document.
#[derive(Debug, Clone)]
pub struct TransactionAppend {
    pub entry_id: String,
    pub month_key: String,
    pub entry: TransactionEntry,
}

/// One ledger mutation: the appended entries, the updated summary, and the
/// idempotency record, persisted all-or-nothing.
///
/// `summary.version` carries the compare-and-swap expectation: the commit is
/// rejected with `Error::Conflict` when the stored summary has moved on.
#[derive(Debug, Clone)]
pub struct LedgerCommit {
    pub cashflow: Option<CashflowAppend>,
    pub transaction: Option<TransactionAppend>,
    pub summary: PortfolioSummary,
    /// `(key, entry_id)`: recorded with the commit so a re-submission of
    /// the same key can be answered without minting a new id.
    pub idempotency_key: Option<(String, String)>,
}

/// Trait defining the contract for ledger persistence.
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    /// Atomically applies a ledger commit. Either every document in the
    /// commit becomes visible or none does. A commit whose idempotency key
    /// was already recorded is a no-op.
    async fn commit(&self, portfolio_id: &str, commit: LedgerCommit) -> Result<()>;

    /// Looks up the entry id previously minted for an idempotency key.
    async fn lookup_idempotency_key(
        &self,
        portfolio_id: &str,
        key: &str,
    ) -> Result<Option<String>>;

    /// Reads a year's cashflow ledger document, keyed by entry id.
    async fn get_cashflows(
        &self,
        portfolio_id: &str,
        year: i32,
    ) -> Result<HashMap<String, CashflowEntry>>;

    /// Reads a month's transaction ledger document, keyed by entry id.
    async fn get_transactions(
        &self,
        portfolio_id: &str,
        month_key: &str,
    ) -> Result<HashMap<String, TransactionEntry>>;
}

/// Trait defining the contract for the ledger mutators.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    /// Records a cash deposit or withdrawal and updates the summary.
    async fn add_cashflow(
        &self,
        portfolio_id: &str,
        input: NewCashflow,
    ) -> Result<MutationOutcome>;

    /// Records a buy or sell, its companion cashflow, and the position and
    /// summary updates.
    async fn add_transaction(
        &self,
        portfolio_id: &str,
        input: NewTransaction,
    ) -> Result<MutationOutcome>;
}
