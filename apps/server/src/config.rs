use chrono_tz::Tz;
use trackvest_core::utils::time_utils::DEFAULT_PORTFOLIO_TZ;

/// Server configuration, read from `TV_*` environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: String,
    /// HMAC secret for issuing and verifying bearer identity tokens.
    pub auth_secret: String,
    pub portfolio_tz: Tz,
    /// When set, every completed month between the watermark and a new
    /// entry gets its own frozen statement instead of only the latest.
    pub backfill_statements: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let listen_addr =
            std::env::var("TV_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:8723".to_string());
        let auth_secret =
            std::env::var("TV_AUTH_SECRET").unwrap_or_else(|_| "trackvest-dev-secret".to_string());
        let portfolio_tz = std::env::var("TV_PORTFOLIO_TZ")
            .ok()
            .and_then(|name| name.parse().ok())
            .unwrap_or(DEFAULT_PORTFOLIO_TZ);
        let backfill_statements = std::env::var("TV_BACKFILL_STATEMENTS")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            listen_addr,
            auth_secret,
            portfolio_tz,
            backfill_statements,
        }
    }
}
