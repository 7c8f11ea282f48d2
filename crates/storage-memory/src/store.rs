use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use trackvest_core::errors::{Error, Result};
use trackvest_core::ledger::{
    CashflowEntry, LedgerCommit, LedgerRepositoryTrait, TransactionEntry,
};
use trackvest_core::portfolio::snapshot::{
    PortfolioSummary, StatementRepositoryTrait, SummaryRepositoryTrait,
};
use trackvest_core::portfolio::{Portfolio, PortfolioRepositoryTrait};

/// Every document stored under one portfolio.
#[derive(Default)]
struct PortfolioDocs {
    info: Option<Portfolio>,
    summary: Option<PortfolioSummary>,
    /// year -> { cf_id -> entry }
    cashflows: HashMap<i32, HashMap<String, CashflowEntry>>,
    /// "YYYY-MM" -> { tx_id -> entry }
    transactions: HashMap<String, HashMap<String, TransactionEntry>>,
    /// year -> { "YYYY-MM" -> frozen summary }
    statements: HashMap<i32, HashMap<String, PortfolioSummary>>,
    /// idempotency key -> minted entry id
    idempotency: HashMap<String, String>,
}

impl PortfolioDocs {
    fn summary_mut(&mut self, portfolio_id: &str) -> Result<&mut PortfolioSummary> {
        self.summary
            .as_mut()
            .ok_or_else(|| Error::NotFound(format!("portfolio summary: {}", portfolio_id)))
    }

    /// CAS check against the stored summary version.
    fn check_version(&mut self, portfolio_id: &str, incoming: &PortfolioSummary) -> Result<()> {
        let stored = self.summary_mut(portfolio_id)?;
        if stored.version != incoming.version {
            return Err(Error::Conflict(format!(
                "summary of {} moved to version {}, writer holds {}",
                portfolio_id, stored.version, incoming.version
            )));
        }
        Ok(())
    }
}

/// In-memory document store. One lock per portfolio: every operation on a
/// portfolio's documents is applied atomically with respect to the others.
#[derive(Default)]
pub struct MemoryStore {
    portfolios: DashMap<String, Arc<Mutex<PortfolioDocs>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn docs(&self, portfolio_id: &str) -> Result<Arc<Mutex<PortfolioDocs>>> {
        self.portfolios
            .get(portfolio_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::NotFound(format!("portfolio: {}", portfolio_id)))
    }

    fn month_key_year(month_key: &str) -> Result<i32> {
        month_key
            .split('-')
            .next()
            .and_then(|year| year.parse().ok())
            .ok_or_else(|| Error::Persistence(format!("malformed month key: {}", month_key)))
    }
}

#[async_trait]
impl PortfolioRepositoryTrait for MemoryStore {
    async fn create(&self, portfolio: Portfolio, summary: PortfolioSummary) -> Result<Portfolio> {
        use dashmap::mapref::entry::Entry;
        match self.portfolios.entry(portfolio.id.clone()) {
            Entry::Occupied(_) => Err(Error::AlreadyExists(format!("portfolio: {}", portfolio.id))),
            Entry::Vacant(slot) => {
                let docs = PortfolioDocs {
                    info: Some(portfolio.clone()),
                    summary: Some(summary),
                    ..Default::default()
                };
                slot.insert(Arc::new(Mutex::new(docs)));
                debug!("Created portfolio {}", portfolio.id);
                Ok(portfolio)
            }
        }
    }

    async fn get(&self, portfolio_id: &str) -> Result<Portfolio> {
        let docs = self.docs(portfolio_id)?;
        let guard = docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard
            .info
            .clone()
            .ok_or_else(|| Error::NotFound(format!("portfolio: {}", portfolio_id)))
    }

    async fn list_for_owner(&self, owner: &str) -> Result<Vec<Portfolio>> {
        let mut portfolios = Vec::new();
        for entry in self.portfolios.iter() {
            let guard = entry
                .value()
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(info) = &guard.info {
                if info.owner == owner {
                    portfolios.push(info.clone());
                }
            }
        }
        portfolios.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(portfolios)
    }

    async fn delete(&self, portfolio_id: &str) -> Result<()> {
        self.portfolios
            .remove(portfolio_id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("portfolio: {}", portfolio_id)))
    }
}

#[async_trait]
impl SummaryRepositoryTrait for MemoryStore {
    async fn get(&self, portfolio_id: &str) -> Result<PortfolioSummary> {
        let docs = self.docs(portfolio_id)?;
        let mut guard = docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.summary_mut(portfolio_id).map(|summary| summary.clone())
    }

    async fn save(&self, portfolio_id: &str, summary: &PortfolioSummary) -> Result<()> {
        let docs = self.docs(portfolio_id)?;
        let mut guard = docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.check_version(portfolio_id, summary)?;
        let mut stored = summary.clone();
        stored.version += 1;
        guard.summary = Some(stored);
        Ok(())
    }
}

#[async_trait]
impl LedgerRepositoryTrait for MemoryStore {
    async fn commit(&self, portfolio_id: &str, commit: LedgerCommit) -> Result<()> {
        let docs = self.docs(portfolio_id)?;
        let mut guard = docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        // A replayed key means the whole commit already happened.
        if let Some((key, _)) = &commit.idempotency_key {
            if guard.idempotency.contains_key(key) {
                debug!(
                    "Ledger commit for {} replayed idempotency key {}, skipping",
                    portfolio_id, key
                );
                return Ok(());
            }
        }

        guard.check_version(portfolio_id, &commit.summary)?;

        if let Some(append) = commit.cashflow {
            guard
                .cashflows
                .entry(append.year)
                .or_default()
                .insert(append.entry_id, append.entry);
        }
        if let Some(append) = commit.transaction {
            guard
                .transactions
                .entry(append.month_key)
                .or_default()
                .insert(append.entry_id, append.entry);
        }
        let mut stored = commit.summary;
        stored.version += 1;
        guard.summary = Some(stored);
        if let Some((key, entry_id)) = commit.idempotency_key {
            guard.idempotency.insert(key, entry_id);
        }
        Ok(())
    }

    async fn lookup_idempotency_key(
        &self,
        portfolio_id: &str,
        key: &str,
    ) -> Result<Option<String>> {
        let docs = self.docs(portfolio_id)?;
        let guard = docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.idempotency.get(key).cloned())
    }

    async fn get_cashflows(
        &self,
        portfolio_id: &str,
        year: i32,
    ) -> Result<HashMap<String, CashflowEntry>> {
        let docs = self.docs(portfolio_id)?;
        let guard = docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.cashflows.get(&year).cloned().unwrap_or_default())
    }

    async fn get_transactions(
        &self,
        portfolio_id: &str,
        month_key: &str,
    ) -> Result<HashMap<String, TransactionEntry>> {
        let docs = self.docs(portfolio_id)?;
        let guard = docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.transactions.get(month_key).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl StatementRepositoryTrait for MemoryStore {
    async fn put_if_absent(
        &self,
        portfolio_id: &str,
        month_key: &str,
        snapshot: &PortfolioSummary,
    ) -> Result<bool> {
        let year = Self::month_key_year(month_key)?;
        let docs = self.docs(portfolio_id)?;
        let mut guard = docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let year_doc = guard.statements.entry(year).or_default();
        if year_doc.contains_key(month_key) {
            return Ok(false);
        }
        year_doc.insert(month_key.to_string(), snapshot.clone());
        Ok(true)
    }

    async fn get_year(
        &self,
        portfolio_id: &str,
        year: i32,
    ) -> Result<HashMap<String, PortfolioSummary>> {
        let docs = self.docs(portfolio_id)?;
        let guard = docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.statements.get(&year).cloned().unwrap_or_default())
    }
}
