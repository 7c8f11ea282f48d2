//! Portfolio module - basic info, the current summary snapshot, the
//! mark-to-market engine, and the monthly statement snapshotter.

pub mod snapshot;
pub mod statement;
pub mod valuation;

mod portfolio_model;
mod portfolio_service;
mod portfolio_traits;

pub use portfolio_model::*;
pub use portfolio_service::*;
pub use portfolio_traits::*;
