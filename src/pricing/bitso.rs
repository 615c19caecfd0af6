use std::str::FromStr;

use anyhow::Result;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::get_json;
use crate::error::BalanceError;

pub const DEFAULT_URL: &str = "https://api.bitso.com/v3/ticker/";

/// Bitso ticker response
#[derive(Debug, Deserialize)]
pub struct TickerResponse {
    #[serde(default)]
    success: bool,
    payload: Option<TickerPayload>,
}

#[derive(Debug, Deserialize)]
struct TickerPayload {
    last: Option<String>,
}

/// Fetch the last traded USDT price in the local currency (e.g. MXN per USDT)
pub async fn fetch_usdt_rate(client: &Client, base_url: &str, local_currency: &str) -> Result<Decimal> {
    info!(
        "Fetching live USDT/{} rate from Bitso",
        local_currency.to_uppercase()
    );

    let url = format!("{}?book=usdt_{}", base_url, local_currency);
    let data: TickerResponse = get_json(client, &url, "Bitso").await?;
    rate_from_response(&data)
}

/// Extract `payload.last`; requires `success` and a positive decimal
pub fn rate_from_response(data: &TickerResponse) -> Result<Decimal> {
    if !data.success {
        return Err(BalanceError::QuoteUnavailable("Bitso reported success=false".to_string()).into());
    }

    let last = data
        .payload
        .as_ref()
        .and_then(|p| p.last.as_deref())
        .ok_or_else(|| BalanceError::QuoteUnavailable("Bitso payload.last missing".to_string()))?;

    let rate = Decimal::from_str(last.trim()).map_err(|_| {
        BalanceError::QuoteUnavailable(format!("Bitso payload.last is not a number: {}", last))
    })?;

    if rate <= Decimal::ZERO {
        return Err(BalanceError::QuoteUnavailable(format!("Bitso rate is not positive: {}", rate)).into());
    }

    Ok(rate)
}
