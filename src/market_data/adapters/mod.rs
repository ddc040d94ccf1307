// Shared trait for price data providers

use crate::market_data::types::{Observation, ProviderResult};

#[async_trait::async_trait]
pub trait PriceProvider: Send + Sync {
    // One snapshot of the tracked asset; any failure skips the caller's cycle.
    async fn fetch(&self) -> ProviderResult<Observation>;
}

pub mod coingecko;
pub mod coingecko_types;
