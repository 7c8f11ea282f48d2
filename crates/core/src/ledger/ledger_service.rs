use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::ledger_model::{
    mint_cashflow_id, mint_transaction_id, CashflowEntry, CashflowReason, CashflowType,
    MutationOutcome, NewCashflow, NewTransaction, TradeSide, TransactionEntry,
};
use super::ledger_traits::{
    CashflowAppend, LedgerCommit, LedgerRepositoryTrait, LedgerServiceTrait, TransactionAppend,
};
use crate::errors::{Error, Result, ValidationError};
use crate::portfolio::snapshot::{PortfolioSummary, SinglePosition, SummaryRepositoryTrait};
use crate::portfolio::statement::StatementServiceTrait;
use crate::portfolio::valuation::ValuationServiceTrait;
use crate::utils::time_utils::{
    display_time, is_entry_time_allowed, local_date, month_key, year_key, DEFAULT_PORTFOLIO_TZ,
};

/// The ledger mutators: `add_cashflow` and `add_transaction`.
///
/// Each mutation runs in two phases. Phase 1 freezes any pending monthly
/// statement, then commits the ledger entries and the summary update in one
/// atomic store write. Phase 2 is a best-effort mark-to-market refresh that
/// replaces the provisional marks with real gateway prices; it never blocks
/// or reverses phase 1.
pub struct LedgerService {
    summary_repository: Arc<dyn SummaryRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    statement_service: Arc<dyn StatementServiceTrait>,
    valuation_service: Arc<dyn ValuationServiceTrait>,
    tz: Tz,
}

impl LedgerService {
    pub fn new(
        summary_repository: Arc<dyn SummaryRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        statement_service: Arc<dyn StatementServiceTrait>,
        valuation_service: Arc<dyn ValuationServiceTrait>,
    ) -> Self {
        Self {
            summary_repository,
            ledger_repository,
            statement_service,
            valuation_service,
            tz: DEFAULT_PORTFOLIO_TZ,
        }
    }

    /// Overrides the portfolio timezone used for entry dates and keys.
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// Answers an idempotent replay without mutating anything.
    async fn replayed_outcome(
        &self,
        portfolio_id: &str,
        input_key: &Option<String>,
    ) -> Result<Option<MutationOutcome>> {
        let Some(key) = input_key else {
            return Ok(None);
        };
        let Some(entry_id) = self
            .ledger_repository
            .lookup_idempotency_key(portfolio_id, key)
            .await?
        else {
            return Ok(None);
        };
        debug!(
            "Idempotency key {} already applied to portfolio {} as {}",
            key, portfolio_id, entry_id
        );
        let summary = self.summary_repository.get(portfolio_id).await?;
        Ok(Some(MutationOutcome {
            entry_id,
            duplicate: true,
            summary,
        }))
    }

    /// Rolls the monthly statement if needed, re-reads the summary the
    /// snapshotter may have re-marked, and gates the entry timestamp
    /// against the watermark.
    async fn prepare_summary(
        &self,
        portfolio_id: &str,
        entry_time: i64,
    ) -> Result<PortfolioSummary> {
        self.statement_service
            .create_monthly_statement_if_needed(portfolio_id, entry_time)
            .await?;

        let summary = self.summary_repository.get(portfolio_id).await?;
        if !is_entry_time_allowed(entry_time, summary.mtm_time_stamp, self.tz) {
            return Err(ValidationError::InvalidInput(format!(
                "entry time {} predates the last mark-to-market watermark {}",
                entry_time, summary.mtm_time_stamp
            ))
            .into());
        }
        Ok(summary)
    }

    /// Phase 2: best-effort valuation refresh with real market prices.
    async fn refresh_marks(&self, portfolio_id: &str, entry_time: i64) {
        let as_of = local_date(entry_time, self.tz);
        if let Err(e) = self
            .valuation_service
            .portfolio_mtm_update(portfolio_id, as_of)
            .await
        {
            warn!(
                "Post-mutation valuation refresh failed for portfolio {}: {}",
                portfolio_id, e
            );
        }
    }

    fn buy_position(
        summary: &PortfolioSummary,
        input: &NewTransaction,
        total_cost: Decimal,
    ) -> SinglePosition {
        match summary.current_positions.get(&input.ticker) {
            Some(existing) => {
                // Cost-weighted blend; fees land in total_cost, not avg_cost.
                let new_amount = existing.amount + input.amount;
                let new_avg_cost = (existing.total_cost + total_cost) / new_amount;
                let mut position = existing.clone();
                position.amount = new_amount;
                position.avg_cost = new_avg_cost;
                position.total_cost = new_avg_cost * new_amount;
                position.apply_mark(input.price);
                position
            }
            None => SinglePosition::open(
                input.ticker.clone(),
                input.asset_class.clone(),
                input.amount,
                input.price,
                total_cost,
            ),
        }
    }
}

#[async_trait]
impl LedgerServiceTrait for LedgerService {
    async fn add_cashflow(
        &self,
        portfolio_id: &str,
        input: NewCashflow,
    ) -> Result<MutationOutcome> {
        if input.amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(
                "cashflow amount must be positive".to_string(),
            )
            .into());
        }
        if let Some(outcome) = self
            .replayed_outcome(portfolio_id, &input.idempotency_key)
            .await?
        {
            return Ok(outcome);
        }

        let mut summary = self.prepare_summary(portfolio_id, input.time).await?;

        let bal_prev = summary.cash_balance;
        let bal_after = match input.flow {
            CashflowType::In => bal_prev + input.amount,
            CashflowType::Out => bal_prev - input.amount,
        };
        if input.flow == CashflowType::Out && bal_after < Decimal::ZERO {
            return Err(Error::InsufficientFunds {
                needed: input.amount,
                available: bal_prev,
            });
        }

        let entry_id = mint_cashflow_id(summary.cashflow_count + 1);
        let date = local_date(input.time, self.tz);
        let entry = CashflowEntry {
            date,
            flow: input.flow,
            amount: input.amount,
            bal_prev,
            bal_after,
            reason: input.reason,
            time_stamp: input.time,
            note: input.note,
            created_at: Utc::now(),
        };

        summary.cashflow_count += 1;
        summary.cash_balance = bal_after;
        summary.net_worth = bal_after + summary.position_value;
        summary.mtm_time_stamp = input.time;
        match input.reason {
            CashflowReason::CashIn => summary.self_capital += input.amount,
            CashflowReason::CashOut => summary.self_capital -= input.amount,
            _ => {}
        }

        self.ledger_repository
            .commit(
                portfolio_id,
                LedgerCommit {
                    cashflow: Some(CashflowAppend {
                        entry_id: entry_id.clone(),
                        year: year_key(date),
                        entry,
                    }),
                    transaction: None,
                    summary: summary.clone(),
                    idempotency_key: input
                        .idempotency_key
                        .map(|key| (key, entry_id.clone())),
                },
            )
            .await?;
        debug!(
            "Cashflow {} added to portfolio {}: balance {} -> {}",
            entry_id, portfolio_id, bal_prev, bal_after
        );

        self.refresh_marks(portfolio_id, input.time).await;

        Ok(MutationOutcome {
            entry_id,
            duplicate: false,
            summary,
        })
    }

    async fn add_transaction(
        &self,
        portfolio_id: &str,
        input: NewTransaction,
    ) -> Result<MutationOutcome> {
        if input.ticker.trim().is_empty() {
            return Err(ValidationError::MissingField("ticker".to_string()).into());
        }
        if input.amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(
                "transaction amount must be positive".to_string(),
            )
            .into());
        }
        if input.price < Decimal::ZERO {
            return Err(
                ValidationError::InvalidInput("price must not be negative".to_string()).into(),
            );
        }
        if input.commission < Decimal::ZERO || input.other_fees < Decimal::ZERO {
            return Err(
                ValidationError::InvalidInput("fees must not be negative".to_string()).into(),
            );
        }
        if let Some(outcome) = self
            .replayed_outcome(portfolio_id, &input.idempotency_key)
            .await?
        {
            return Ok(outcome);
        }

        let mut summary = self.prepare_summary(portfolio_id, input.time).await?;
        let date = local_date(input.time, self.tz);
        let gross = input.amount * input.price;

        let (total_cost, cashflow) = match input.side {
            TradeSide::Buy => {
                let total_cost = gross + input.commission + input.other_fees;
                if total_cost > summary.cash_balance {
                    return Err(Error::InsufficientFunds {
                        needed: total_cost,
                        available: summary.cash_balance,
                    });
                }

                let position = Self::buy_position(&summary, &input, total_cost);
                summary
                    .current_positions
                    .insert(input.ticker.clone(), position);

                let bal_prev = summary.cash_balance;
                let entry = CashflowEntry {
                    date,
                    flow: CashflowType::Out,
                    amount: total_cost,
                    bal_prev,
                    bal_after: bal_prev - total_cost,
                    reason: CashflowReason::Buy,
                    time_stamp: input.time,
                    note: Some(format!(
                        "Buy {} @ ${} x {}",
                        input.ticker, input.price, input.amount
                    )),
                    created_at: Utc::now(),
                };
                summary.cash_balance = entry.bal_after;
                (total_cost, entry)
            }
            TradeSide::Sell => {
                let held = summary
                    .current_positions
                    .get(&input.ticker)
                    .map(|position| position.amount)
                    .unwrap_or(Decimal::ZERO);
                if input.amount > held {
                    return Err(Error::InsufficientPosition {
                        ticker: input.ticker.clone(),
                        requested: input.amount,
                        held,
                    });
                }

                // avg_cost never moves on a sell; a flat position is removed
                // rather than kept as a zero row.
                let new_amount = held - input.amount;
                if new_amount.is_zero() {
                    summary.current_positions.remove(&input.ticker);
                } else if let Some(position) = summary.current_positions.get_mut(&input.ticker) {
                    position.amount = new_amount;
                    position.total_cost = position.avg_cost * new_amount;
                    position.apply_mark(input.price);
                }

                let proceeds = gross - input.commission - input.other_fees;
                let bal_prev = summary.cash_balance;
                let entry = CashflowEntry {
                    date,
                    flow: CashflowType::In,
                    amount: proceeds,
                    bal_prev,
                    bal_after: bal_prev + proceeds,
                    reason: CashflowReason::Sell,
                    time_stamp: input.time,
                    note: Some(format!(
                        "Sell {} @ ${} x {}",
                        input.ticker, input.price, input.amount
                    )),
                    created_at: Utc::now(),
                };
                summary.cash_balance = entry.bal_after;
                (proceeds, entry)
            }
        };

        let cashflow_id = mint_cashflow_id(summary.cashflow_count + 1);
        let transaction_id = mint_transaction_id(summary.transaction_count + 1);
        let transaction = TransactionEntry {
            ticker: input.ticker.clone(),
            asset_class: input.asset_class.clone(),
            amount: input.amount,
            price: input.price,
            side: input.side,
            time_stamp: input.time,
            time: display_time(input.time, self.tz),
            commission: input.commission,
            other_fees: input.other_fees,
            total_cost,
            note: input.note.clone(),
            created_at: Utc::now(),
        };

        summary.cashflow_count += 1;
        summary.transaction_count += 1;
        summary.recompute_aggregates();
        summary.mtm_time_stamp = input.time;

        self.ledger_repository
            .commit(
                portfolio_id,
                LedgerCommit {
                    cashflow: Some(CashflowAppend {
                        entry_id: cashflow_id,
                        year: year_key(date),
                        entry: cashflow,
                    }),
                    transaction: Some(TransactionAppend {
                        entry_id: transaction_id.clone(),
                        month_key: month_key(date),
                        entry: transaction,
                    }),
                    summary: summary.clone(),
                    idempotency_key: input
                        .idempotency_key
                        .map(|key| (key, transaction_id.clone())),
                },
            )
            .await?;
        debug!(
            "Transaction {} added to portfolio {}: {:?} {} x {}",
            transaction_id, portfolio_id, input.side, input.ticker, input.amount
        );

        self.refresh_marks(portfolio_id, input.time).await;

        Ok(MutationOutcome {
            entry_id: transaction_id,
            duplicate: false,
            summary,
        })
    }
}
