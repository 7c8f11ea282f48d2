//! Portfolio basic-info domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Basic information of a portfolio, stored at `portfolios/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub portfolio_name: String,
    pub broker: String,
    #[serde(default)]
    pub note: String,
    pub owner: String,
    #[serde(default)]
    pub shared_with: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Input model for creating a new portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub id: String,
    pub portfolio_name: String,
    pub broker: String,
    #[serde(default)]
    pub note: String,
    pub owner: String,
    #[serde(default)]
    pub shared_with: Vec<String>,
}
