// CoinGecko simple-price adapter

use std::time::Duration;

use reqwest::header::ACCEPT;
use tracing::{debug, instrument};

use super::coingecko_types::{FieldNames, SimplePriceQuery, SimplePriceResponse};
use super::PriceProvider;
use crate::config::Settings;
use crate::market_data::types::{Observation, ProviderError, ProviderResult};

pub struct CoinGeckoAdapter {
    client: reqwest::Client,
    pub url: String,         // ".../api/v3/simple/price"
    pub asset_id: String,    // e.g. "solana"
    pub vs_currency: String, // e.g. "usd"
}

impl CoinGeckoAdapter {
    pub fn new(url: &str, asset_id: &str, vs_currency: &str, timeout: Duration) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("solpulse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            asset_id: asset_id.to_string(),
            vs_currency: vs_currency.to_lowercase(),
        })
    }

    pub fn from_settings(settings: &Settings) -> ProviderResult<Self> {
        Self::new(
            &settings.price_api_url,
            &settings.asset_id,
            &settings.vs_currency,
            settings.http_timeout(),
        )
    }

    // Pick our asset out of the response body.
    pub(crate) fn parse(&self, body: &str) -> ProviderResult<Observation> {
        let response: SimplePriceResponse = serde_json::from_str(body)?;
        let entry = response
            .get(&self.asset_id)
            .ok_or_else(|| ProviderError::MissingAsset(self.asset_id.clone()))?;

        let names = FieldNames::for_currency(&self.vs_currency);
        let field = |name: &str| -> ProviderResult<f64> {
            entry
                .get(name)
                .copied()
                .flatten()
                .ok_or_else(|| ProviderError::MissingField(name.to_string()))
        };

        Ok(Observation {
            price: field(names.price.as_str())?,
            market_cap: field(names.market_cap.as_str())?,
            volume_24h: field(names.volume_24h.as_str())?,
            change_24h: field(names.change_24h.as_str())?,
            last_updated_at: field(names.last_updated_at)? as i64,
        })
    }
}

#[async_trait::async_trait]
impl PriceProvider for CoinGeckoAdapter {
    #[instrument(skip(self), fields(asset = %self.asset_id))]
    async fn fetch(&self) -> ProviderResult<Observation> {
        let query = SimplePriceQuery {
            ids: &self.asset_id,
            vs_currencies: &self.vs_currency,
            include_market_cap: true,
            include_24hr_vol: true,
            include_24hr_change: true,
            include_last_updated_at: true,
        };

        let res = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .query(&query)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }

        let body = res.text().await?;
        let observation = self.parse(&body)?;
        debug!(price = observation.price, ts = observation.last_updated_at, "Fetched observation");
        Ok(observation)
    }
}
