// Market data module entrypoint
pub mod adapters;   // price providers (e.g. CoinGecko)
pub mod delta;      // change between consecutive observations
pub mod types;      // Observation + provider errors

pub use adapters::PriceProvider;
pub use types::{Observation, ProviderError, ProviderResult};
