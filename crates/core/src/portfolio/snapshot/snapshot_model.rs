//! Portfolio summary and position domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One open position inside a portfolio summary.
///
/// Cost basis follows the average-cost method: buys blend into `avg_cost`,
/// sells never change it. Commission and fees are carried by `total_cost`
/// only; the per-unit figure excludes trading costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinglePosition {
    pub ticker: String,
    pub asset_class: String,
    /// Signed unit count; stays >= 0. A position at zero is removed from
    /// the summary rather than kept as a flat row.
    pub amount: Decimal,
    pub avg_cost: Decimal,
    pub total_cost: Decimal,
    pub market_price: Decimal,
    pub market_value: Decimal,
    pub pnl: Decimal,
    /// Percentage formatted as a string, two decimals with a trailing `%`.
    pub pnl_pct: String,
}

impl SinglePosition {
    /// Opens a fresh position from a first buy. The fill price becomes the
    /// average cost; `total_cost` carries the fees.
    pub fn open(
        ticker: impl Into<String>,
        asset_class: impl Into<String>,
        amount: Decimal,
        price: Decimal,
        total_cost: Decimal,
    ) -> Self {
        let mut position = SinglePosition {
            ticker: ticker.into(),
            asset_class: asset_class.into(),
            amount,
            avg_cost: price,
            total_cost,
            market_price: price,
            market_value: amount * price,
            pnl: Decimal::ZERO,
            pnl_pct: "0.00%".to_string(),
        };
        position.apply_mark(price);
        position
    }

    /// Re-marks the position at `price`, refreshing value and P&L.
    pub fn apply_mark(&mut self, price: Decimal) {
        self.market_price = price;
        self.market_value = price * self.amount;
        self.pnl = (price - self.avg_cost) * self.amount;
        self.pnl_pct = format_pnl_pct(price, self.avg_cost);
    }
}

/// Formats the relative P&L of `price` against `avg_cost` as a two-decimal
/// percentage string.
pub fn format_pnl_pct(price: Decimal, avg_cost: Decimal) -> String {
    if avg_cost.is_zero() {
        return "0.00%".to_string();
    }
    let pct = (price / avg_cost - Decimal::ONE) * Decimal::ONE_HUNDRED;
    format!("{:.2}%", pct)
}

/// The single mutable "current" document of a portfolio.
///
/// Mutated by every ledger operation and by the mark-to-market engine;
/// frozen copies of it become the monthly statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub cash_balance: Decimal,
    pub margin_balance: Decimal,
    pub position_value: Decimal,
    pub net_worth: Decimal,
    /// Owner deposits minus withdrawals, as opposed to investment gains.
    pub self_capital: Decimal,
    /// Sequence counters used to mint ordered ledger entry ids.
    pub cashflow_count: u64,
    pub transaction_count: u64,
    /// Epoch millis of the last date positions were marked to market.
    /// Acts as a logical clock: later entries must not predate it.
    pub mtm_time_stamp: i64,
    #[serde(default)]
    pub current_positions: HashMap<String, SinglePosition>,
    /// Optimistic-concurrency token, bumped by the store on every write.
    /// A writer holding a stale version is rejected with a conflict.
    #[serde(default)]
    pub version: u64,
}

impl Default for PortfolioSummary {
    fn default() -> Self {
        PortfolioSummary {
            cash_balance: Decimal::ZERO,
            margin_balance: Decimal::ZERO,
            position_value: Decimal::ZERO,
            net_worth: Decimal::ZERO,
            self_capital: Decimal::ZERO,
            cashflow_count: 0,
            transaction_count: 0,
            mtm_time_stamp: 0,
            current_positions: HashMap::new(),
            version: 0,
        }
    }
}

impl PortfolioSummary {
    /// Recomputes `position_value` as the sum of market values over the open
    /// positions, and `net_worth` from cash plus positions.
    pub fn recompute_aggregates(&mut self) {
        self.position_value = self
            .current_positions
            .values()
            .map(|position| position.market_value)
            .sum();
        self.net_worth = self.cash_balance + self.position_value;
    }
}
