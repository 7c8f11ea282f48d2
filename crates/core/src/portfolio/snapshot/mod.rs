//! Portfolio snapshot module - the current summary document and its
//! frozen monthly copies.

mod snapshot_model;
mod snapshot_traits;

pub use snapshot_model::*;
pub use snapshot_traits::*;
