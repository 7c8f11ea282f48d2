//! Shared constants for ledger identifiers and display formats.

/// Prefix of minted cashflow entry ids (`cf_000001`, ...).
pub const CASHFLOW_ID_PREFIX: &str = "cf_";

/// Prefix of minted transaction entry ids (`tx_000001`, ...).
pub const TRANSACTION_ID_PREFIX: &str = "tx_";

/// Ledger sequence numbers are zero-padded to this width.
pub const LEDGER_ID_PAD_WIDTH: usize = 6;

/// Display format for entry timestamps in the portfolio timezone.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Statement and transaction documents are keyed by `YYYY-MM`.
pub const MONTH_KEY_FORMAT: &str = "%Y-%m";
