//! Summary and statement repository traits.
//!
//! These traits define the contract against the document store without any
//! store-specific types, allowing for different storage implementations.

use async_trait::async_trait;
use std::collections::HashMap;

use super::snapshot_model::PortfolioSummary;
use crate::errors::Result;

/// Persistence contract for the live `portfolio_summary/current` document.
#[async_trait]
pub trait SummaryRepositoryTrait: Send + Sync {
    /// Reads the current summary of a portfolio.
    async fn get(&self, portfolio_id: &str) -> Result<PortfolioSummary>;

    /// Writes the full summary snapshot in one document write.
    ///
    /// Compare-and-swap: `summary.version` must equal the stored version,
    /// otherwise the write is rejected with `Error::Conflict`. The store
    /// persists the document with the version bumped by one.
    async fn save(&self, portfolio_id: &str, summary: &PortfolioSummary) -> Result<()>;
}

/// Persistence contract for frozen monthly statements, keyed `YYYY-MM`
/// under their calendar year.
#[async_trait]
pub trait StatementRepositoryTrait: Send + Sync {
    /// Freezes `snapshot` under `month_key` unless that month already has a
    /// statement. Returns false (writing nothing) when it does; a frozen
    /// month is never altered. Other months of the same year are untouched.
    async fn put_if_absent(
        &self,
        portfolio_id: &str,
        month_key: &str,
        snapshot: &PortfolioSummary,
    ) -> Result<bool>;

    /// Reads all frozen statements of a calendar year, keyed `YYYY-MM`.
    async fn get_year(
        &self,
        portfolio_id: &str,
        year: i32,
    ) -> Result<HashMap<String, PortfolioSummary>>;
}
