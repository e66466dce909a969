use std::sync::Arc;

use finmate_market_data::MarketDataClients;
use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

lazy_static! {
    /// Letters, dots and dashes, up to 10 characters (e.g. BRK.B, RDS-A)
    static ref PLAIN_TICKER: Regex =
        Regex::new(r"^[A-Za-z.\-]{1,10}$").expect("Invalid regex pattern");

    /// Format: two-letter country, nine alphanumerics, one check digit
    static ref ISIN: Regex =
        Regex::new(r"^[A-Z]{2}[A-Z0-9]{9}[0-9]$").expect("Invalid regex pattern");
}

/// True when `input` can be used as a ticker without a lookup.
pub fn is_plain_ticker(input: &str) -> bool {
    PLAIN_TICKER.is_match(input)
}

/// True for a syntactically valid ISIN (checksum digit is not verified).
pub fn is_isin(input: &str) -> bool {
    ISIN.is_match(input)
}

/// Maps an identifier to a ticker, falling back to a Polygon search.
pub struct TickerResolver {
    clients: Arc<MarketDataClients>,
}

impl TickerResolver {
    pub fn new(clients: Arc<MarketDataClients>) -> Self {
        Self { clients }
    }

    /// Resolve `input` to an upper-cased ticker.
    ///
    /// Returns `None` for blank input, an empty search result, or a failed lookup.
    pub async fn resolve(&self, input: &str) -> Option<String> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if is_plain_ticker(input) {
            return Some(input.to_uppercase());
        }

        let upper = input.to_uppercase();
        let query = if is_isin(&upper) { upper.as_str() } else { input };
        match self.clients.polygon.search_ticker(query).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Ticker resolution failed for '{}': {}", input, e);
                None
            }
        }
    }
}
