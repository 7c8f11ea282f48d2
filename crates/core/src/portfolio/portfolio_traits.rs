//! Portfolio repository and service traits.

use async_trait::async_trait;

use super::portfolio_model::{NewPortfolio, Portfolio};
use super::snapshot::PortfolioSummary;
use crate::errors::Result;

/// Trait defining the contract for portfolio basic-info persistence.
#[async_trait]
pub trait PortfolioRepositoryTrait: Send + Sync {
    /// Creates the portfolio document together with its initial (all-zero)
    /// summary. Fails with `AlreadyExists` when the id is taken.
    async fn create(&self, portfolio: Portfolio, summary: PortfolioSummary) -> Result<Portfolio>;

    /// Retrieves a portfolio by its id.
    async fn get(&self, portfolio_id: &str) -> Result<Portfolio>;

    /// Lists the portfolios owned by `owner`.
    async fn list_for_owner(&self, owner: &str) -> Result<Vec<Portfolio>>;

    /// Deletes a portfolio and everything stored under it.
    async fn delete(&self, portfolio_id: &str) -> Result<()>;
}

/// Trait defining the contract for portfolio service operations.
#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    /// Creates a new portfolio with an empty summary.
    async fn create_portfolio(&self, new_portfolio: NewPortfolio) -> Result<Portfolio>;

    /// Retrieves a portfolio by id.
    async fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio>;

    /// Lists the portfolios owned by `owner`.
    async fn list_portfolios(&self, owner: &str) -> Result<Vec<Portfolio>>;

    /// Reads the current summary snapshot.
    async fn get_summary(&self, portfolio_id: &str) -> Result<PortfolioSummary>;
}
