mod ledger;
mod portfolio;
mod prices;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::require_auth;
use crate::main_lib::AppState;

async fn root() -> &'static str {
    "This is Trackvest."
}

pub fn app_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        // Market price gateway
        .route("/close-price", post(prices::close_price))
        .route("/batch-mtm", post(prices::batch_mtm))
        // Portfolios
        .route(
            "/portfolios",
            post(portfolio::create_portfolio).get(portfolio::list_portfolios),
        )
        .route("/portfolios/{id}", get(portfolio::get_portfolio))
        .route("/portfolios/{id}/summary", get(portfolio::get_summary))
        .route(
            "/portfolios/{id}/statements/{year}",
            get(portfolio::list_statements),
        )
        // Ledger
        .route("/portfolios/{id}/cashflows", post(ledger::add_cashflow))
        .route(
            "/portfolios/{id}/cashflows/{year}",
            get(ledger::list_cashflows),
        )
        .route(
            "/portfolios/{id}/transactions",
            post(ledger::add_transaction),
        )
        .route(
            "/portfolios/{id}/transactions/{month}",
            get(ledger::list_transactions),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/", get(root))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
