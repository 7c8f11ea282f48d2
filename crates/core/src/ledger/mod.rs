//! Ledger module - append-only cashflow and transaction entries and the
//! mutators that keep the summary consistent with them.

mod ledger_model;
mod ledger_service;
mod ledger_traits;

pub use ledger_model::*;
pub use ledger_service::*;
pub use ledger_traits::*;
