// Source: https://api.coingecko.com/api/v3/simple/price
use std::collections::HashMap;

#[derive(Debug, serde::Serialize)]
pub struct SimplePriceQuery<'a> {
    pub ids: &'a str,           // e.g. "solana"
    pub vs_currencies: &'a str, // e.g. "usd"
    pub include_market_cap: bool,
    pub include_24hr_vol: bool,
    pub include_24hr_change: bool,
    pub include_last_updated_at: bool,
}

// {"solana": {"usd": 150.0, "usd_market_cap": ..., "usd_24h_vol": ...,
//             "usd_24h_change": ..., "last_updated_at": 1718000000}}
// Fields the API cannot compute come back as null.
pub type SimplePriceResponse = HashMap<String, HashMap<String, Option<f64>>>;

pub struct FieldNames {
    pub price: String,
    pub market_cap: String,
    pub volume_24h: String,
    pub change_24h: String,
    pub last_updated_at: &'static str,
}

impl FieldNames {
    // Keys are prefixed with the quote currency.
    pub fn for_currency(vs_currency: &str) -> Self {
        Self {
            price: vs_currency.to_string(),
            market_cap: format!("{}_market_cap", vs_currency),
            volume_24h: format!("{}_24h_vol", vs_currency),
            change_24h: format!("{}_24h_change", vs_currency),
            last_updated_at: "last_updated_at",
        }
    }
}
