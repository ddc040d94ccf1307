//! Process settings, read from the environment (and `.env` when present).

use std::fmt;
use std::time::Duration;

use config::{Config, Environment};
use serde::Deserialize;

pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("TELEGRAM_TOKEN is not set")]
    MissingToken,

    #[error("UPDATE_INTERVAL_SECS must be greater than zero")]
    InvalidInterval,
}

#[derive(Clone, Deserialize)]
pub struct Settings {
    pub telegram_token: String,
    pub price_api_url: String,
    pub asset_id: String,     // provider id, e.g. "solana"
    pub asset_symbol: String, // shown in messages, e.g. "SOL"
    pub vs_currency: String,  // quote currency, e.g. "usd"
    pub update_interval_secs: u64,
    pub http_timeout_secs: u64,
    pub metrics_port: u16,
}

// Keeps the bot token out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("telegram_token", &"<redacted>")
            .field("price_api_url", &self.price_api_url)
            .field("asset_id", &self.asset_id)
            .field("asset_symbol", &self.asset_symbol)
            .field("vs_currency", &self.vs_currency)
            .field("update_interval_secs", &self.update_interval_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("metrics_port", &self.metrics_port)
            .finish()
    }
}

impl Settings {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::default())
    }

    fn load(env: Environment) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("telegram_token", "")?
            .set_default("price_api_url", DEFAULT_PRICE_API_URL)?
            .set_default("asset_id", "solana")?
            .set_default("asset_symbol", "SOL")?
            .set_default("vs_currency", "usd")?
            .set_default("update_interval_secs", 60)?
            .set_default("http_timeout_secs", 10)?
            .set_default("metrics_port", 9000)?
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.update_interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Currency label used in messages, e.g. "USD".
    pub fn currency_label(&self) -> String {
        self.vs_currency.to_uppercase()
    }
}
