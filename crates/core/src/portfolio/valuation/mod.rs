//! Mark-to-market engine: refreshes position marks and summary aggregates
//! from gateway closing prices.

mod valuation_service;
mod valuation_traits;

pub use valuation_service::*;
pub use valuation_traits::*;

#[cfg(test)]
mod valuation_service_tests;
