//! Market price gateway surface for Trackvest.
//!
//! This crate defines the [`ClosePriceProvider`] trait the portfolio core
//! consumes, an HTTP [`GatewayClient`] for the authenticated price gateway,
//! and a [`YahooProvider`] used by the gateway itself to resolve closing
//! prices.

pub mod client;
pub mod errors;
pub mod models;
pub mod provider;

pub use client::{GatewayClient, StaticTokenProvider, TokenProvider};
pub use errors::MarketDataError;
pub use models::{BatchMtmResponse, ClosePrice, ClosePriceResponse, HistoricalClose};
pub use provider::{ClosePriceProvider, YahooProvider};
