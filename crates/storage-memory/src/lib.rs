//! In-memory document store binding for the Trackvest core.
//!
//! Implements the core repository traits over a per-portfolio document set
//! guarded by one lock, which is what gives `LedgerRepositoryTrait::commit`
//! its all-or-nothing semantics. Useful as the server's default store and
//! as a faithful stand-in for a remote document database in tests.

mod store;

pub use store::MemoryStore;
