use chrono::Utc;
use log::debug;
use std::sync::Arc;

use super::portfolio_model::{NewPortfolio, Portfolio};
use super::portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
use super::snapshot::{PortfolioSummary, SummaryRepositoryTrait};
use crate::errors::{Result, ValidationError};

/// Service for managing portfolio basic info and its summary lifecycle.
pub struct PortfolioService {
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    summary_repository: Arc<dyn SummaryRepositoryTrait>,
}

impl PortfolioService {
    pub fn new(
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        summary_repository: Arc<dyn SummaryRepositoryTrait>,
    ) -> Self {
        Self {
            portfolio_repository,
            summary_repository,
        }
    }
}

#[async_trait::async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn create_portfolio(&self, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        if new_portfolio.id.trim().is_empty() {
            return Err(ValidationError::MissingField("id".to_string()).into());
        }
        if new_portfolio.portfolio_name.trim().is_empty() {
            return Err(ValidationError::MissingField("portfolioName".to_string()).into());
        }

        let portfolio = Portfolio {
            id: new_portfolio.id,
            portfolio_name: new_portfolio.portfolio_name,
            broker: new_portfolio.broker,
            note: new_portfolio.note,
            owner: new_portfolio.owner,
            shared_with: new_portfolio.shared_with,
            created_at: Utc::now(),
        };
        debug!("Creating portfolio {} with empty summary", portfolio.id);

        // The summary document is born all-zero and lives as long as the
        // portfolio does.
        self.portfolio_repository
            .create(portfolio, PortfolioSummary::default())
            .await
    }

    async fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        self.portfolio_repository.get(portfolio_id).await
    }

    async fn list_portfolios(&self, owner: &str) -> Result<Vec<Portfolio>> {
        self.portfolio_repository.list_for_owner(owner).await
    }

    async fn get_summary(&self, portfolio_id: &str) -> Result<PortfolioSummary> {
        self.summary_repository.get(portfolio_id).await
    }
}
