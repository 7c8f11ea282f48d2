use async_trait::async_trait;

use crate::errors::Result;

/// Trait defining the contract for monthly statement rollovers.
#[async_trait]
pub trait StatementServiceTrait: Send + Sync {
    /// Detects whether `new_entry_time` crosses the month boundary of the
    /// current mark-to-market watermark and, if so, freezes the closing
    /// month's statement before returning.
    ///
    /// Must run, and complete, before the triggering cashflow or transaction
    /// mutation proceeds. An already-frozen month is left untouched.
    async fn create_monthly_statement_if_needed(
        &self,
        portfolio_id: &str,
        new_entry_time: i64,
    ) -> Result<()>;
}
