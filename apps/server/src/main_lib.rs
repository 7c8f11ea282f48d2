use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use trackvest_core::ledger::{LedgerRepositoryTrait, LedgerService, LedgerServiceTrait};
use trackvest_core::portfolio::snapshot::{
    StatementRepositoryTrait, SummaryRepositoryTrait,
};
use trackvest_core::portfolio::statement::StatementService;
use trackvest_core::portfolio::valuation::ValuationService;
use trackvest_core::portfolio::{PortfolioRepositoryTrait, PortfolioService, PortfolioServiceTrait};
use trackvest_market_data::provider::ClosePriceProvider;
use trackvest_market_data::YahooProvider;
use trackvest_storage_memory::MemoryStore;

use crate::auth::AuthManager;
use crate::config::Config;

pub struct AppState {
    pub portfolio_service: Arc<dyn PortfolioServiceTrait>,
    pub ledger_service: Arc<dyn LedgerServiceTrait>,
    pub ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    pub statement_repository: Arc<dyn StatementRepositoryTrait>,
    pub price_provider: Arc<dyn ClosePriceProvider>,
    pub auth: Arc<AuthManager>,
}

pub fn init_tracing() {
    let log_format = std::env::var("TV_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let provider: Arc<dyn ClosePriceProvider> = Arc::new(YahooProvider::new()?);
    Ok(build_state_with_provider(config, provider))
}

/// Wires the core services over the in-memory store and the given price
/// provider. Tests inject a deterministic provider here.
pub fn build_state_with_provider(
    config: &Config,
    price_provider: Arc<dyn ClosePriceProvider>,
) -> Arc<AppState> {
    let store = Arc::new(MemoryStore::new());

    let portfolio_repository: Arc<dyn PortfolioRepositoryTrait> = store.clone();
    let summary_repository: Arc<dyn SummaryRepositoryTrait> = store.clone();
    let ledger_repository: Arc<dyn LedgerRepositoryTrait> = store.clone();
    let statement_repository: Arc<dyn StatementRepositoryTrait> = store.clone();

    let valuation_service = Arc::new(
        ValuationService::new(summary_repository.clone(), price_provider.clone())
            .with_timezone(config.portfolio_tz),
    );
    let statement_service = Arc::new(
        StatementService::new(
            summary_repository.clone(),
            statement_repository.clone(),
            valuation_service.clone(),
        )
        .with_timezone(config.portfolio_tz)
        .with_backfill(config.backfill_statements),
    );
    let ledger_service = Arc::new(
        LedgerService::new(
            summary_repository.clone(),
            ledger_repository.clone(),
            statement_service,
            valuation_service,
        )
        .with_timezone(config.portfolio_tz),
    );
    let portfolio_service = Arc::new(PortfolioService::new(
        portfolio_repository,
        summary_repository,
    ));

    Arc::new(AppState {
        portfolio_service,
        ledger_service,
        ledger_repository,
        statement_repository,
        price_provider,
        auth: Arc::new(AuthManager::new(&config.auth_secret)),
    })
}
