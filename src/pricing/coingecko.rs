use std::collections::HashMap;

use anyhow::Result;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use super::{get_json, PriceTable, SUPPORTED_ASSETS};
use crate::error::BalanceError;

pub const DEFAULT_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// CoinGecko `simple/price` response: coin id -> quote
pub type SimplePriceResponse = HashMap<String, CoinQuote>;

#[derive(Debug, Deserialize)]
pub struct CoinQuote {
    usd: Option<Decimal>,
}

/// Build the request URL for every supported coin, priced in USD
pub fn price_url(base_url: &str) -> String {
    let ids = SUPPORTED_ASSETS
        .iter()
        .map(|(_, id)| *id)
        .collect::<Vec<_>>()
        .join(",");
    format!("{}?ids={}&vs_currencies=usd", base_url, ids)
}

/// Fetch USD spot prices for all supported symbols
pub async fn fetch_spot_prices(client: &Client, base_url: &str) -> Result<PriceTable> {
    info!("Fetching live prices from CoinGecko");

    let data: SimplePriceResponse = get_json(client, &price_url(base_url), "CoinGecko").await?;
    price_table_from_response(&data)
}

/// Map coin ids back to symbols. Coins missing from the response are left out;
/// an empty result is an error.
pub fn price_table_from_response(data: &SimplePriceResponse) -> Result<PriceTable> {
    let mut prices = PriceTable::new();

    for (symbol, coin_id) in SUPPORTED_ASSETS {
        match data.get(*coin_id).and_then(|quote| quote.usd) {
            Some(price) => {
                prices.insert(symbol.to_string(), price);
            }
            None => debug!("No CoinGecko price for {} ({})", symbol, coin_id),
        }
    }

    if prices.is_empty() {
        return Err(
            BalanceError::QuoteUnavailable("no prices returned from CoinGecko".to_string()).into(),
        );
    }

    Ok(prices)
}
