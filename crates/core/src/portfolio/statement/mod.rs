//! Monthly statement snapshotter: freezes an end-of-month copy of the
//! summary before the first mutation of a new period proceeds.

mod statement_service;
mod statement_traits;

pub use statement_service::*;
pub use statement_traits::*;

#[cfg(test)]
mod statement_service_tests;
