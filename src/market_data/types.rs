use chrono::{DateTime, Utc};

/// One polled snapshot of the tracked asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub price: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub change_24h: f64,     // percent, as reported by the provider
    pub last_updated_at: i64, // unix seconds
}

impl Observation {
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.last_updated_at, 0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("price API answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed price response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("asset `{0}` missing from price response")]
    MissingAsset(String),

    #[error("field `{0}` missing from price response")]
    MissingField(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
