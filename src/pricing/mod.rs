// Pricing module - live spot prices (CoinGecko) and local fiat rate (Bitso)

pub mod bitso;
pub mod coingecko;

use std::collections::HashMap;

use anyhow::{Context, Result};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::BalanceError;

/// Assets with a live quote: (symbol, CoinGecko id)
pub const SUPPORTED_ASSETS: &[(&str, &str)] = &[
    ("btc", "bitcoin"),
    ("eth", "ethereum"),
    ("sol", "solana"),
    ("usdt", "tether"),
    ("xrp", "ripple"),
    ("ada", "cardano"),
    ("dot", "polkadot"),
    ("matic", "polygon"),
    ("doge", "dogecoin"),
    ("bnb", "binancecoin"),
    ("ltc", "litecoin"),
    ("link", "chainlink"),
    ("uni", "uniswap"),
    ("xlm", "stellar"),
    ("avax", "avalanche-2"),
    ("atom", "cosmos"),
];

/// Symbol (lowercase) -> USD spot price
pub type PriceTable = HashMap<String, Decimal>;

/// Comma separated, uppercased list of supported symbols for diagnostics
pub fn supported_symbols() -> String {
    SUPPORTED_ASSETS
        .iter()
        .map(|(symbol, _)| symbol.to_uppercase())
        .collect::<Vec<_>>()
        .join(", ")
}

/// How a currency symbol is valued against USD
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Currency {
    Usd,
    Usdt,
    /// The configured local fiat (e.g. mxn), valued through the USDT rate
    Local,
    Asset(String),
}

impl Currency {
    pub fn classify(symbol: &str, local_currency: &str) -> Self {
        let symbol = symbol.to_lowercase();
        match symbol.as_str() {
            "usd" => Currency::Usd,
            "usdt" => Currency::Usdt,
            s if s == local_currency => Currency::Local,
            _ => Currency::Asset(symbol),
        }
    }

    /// Fiat and stablecoins: shown with 2 decimals and left out of the P&L table
    pub fn is_cash(&self) -> bool {
        !matches!(self, Currency::Asset(_))
    }
}

/// Source of live quotes. Each method is called once per report run.
#[allow(async_fn_in_trait)]
pub trait QuoteSource {
    async fn get_spot_prices(&self) -> Result<PriceTable>;

    /// Local currency units per 1 USDT
    async fn get_local_to_usdt_rate(&self) -> Result<Decimal>;
}

/// Quote source backed by the CoinGecko and Bitso public APIs
pub struct LiveQuoteSource {
    client: Client,
    coingecko_url: String,
    bitso_url: String,
    local_currency: String,
}

impl LiveQuoteSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; BalanceBot/1.0)")
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            coingecko_url: config.coingecko_url.clone(),
            bitso_url: config.bitso_url.clone(),
            local_currency: config.local_currency.clone(),
        })
    }
}

impl QuoteSource for LiveQuoteSource {
    async fn get_spot_prices(&self) -> Result<PriceTable> {
        coingecko::fetch_spot_prices(&self.client, &self.coingecko_url).await
    }

    async fn get_local_to_usdt_rate(&self) -> Result<Decimal> {
        bitso::fetch_usdt_rate(&self.client, &self.bitso_url, &self.local_currency).await
    }
}

/// GET a JSON document, mapping every failure to `QuoteUnavailable`
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    service: &str,
) -> Result<T> {
    debug!("GET {}", url);

    let response = client.get(url).send().await.map_err(|e| {
        BalanceError::QuoteUnavailable(format!("request to {} failed: {}", service, e))
    })?;

    if !response.status().is_success() {
        return Err(BalanceError::QuoteUnavailable(format!(
            "{} returned error status: {}",
            service,
            response.status()
        ))
        .into());
    }

    let data = response.json::<T>().await.map_err(|e| {
        BalanceError::QuoteUnavailable(format!("failed to parse {} response: {}", service, e))
    })?;

    Ok(data)
}

/// Live prices and rate resolved once per run; immutable afterwards
#[derive(Debug, Clone)]
pub struct Quotes {
    prices: PriceTable,
    local_per_usdt: Decimal,
    local_currency: String,
}

impl Quotes {
    pub fn new(prices: PriceTable, local_per_usdt: Decimal, local_currency: &str) -> Self {
        Self {
            prices,
            local_per_usdt,
            local_currency: local_currency.to_lowercase(),
        }
    }

    /// Fetch prices first, then the local rate. Any failure aborts the run.
    pub async fn fetch<Q: QuoteSource>(source: &Q, local_currency: &str) -> Result<Self> {
        let prices = source.get_spot_prices().await?;
        if prices.is_empty() {
            return Err(BalanceError::QuoteUnavailable("no prices returned".to_string()).into());
        }
        info!("Fetched prices for {} cryptocurrencies", prices.len());

        let rate = source.get_local_to_usdt_rate().await?;
        if rate <= Decimal::ZERO {
            return Err(BalanceError::QuoteUnavailable(format!(
                "non-positive USDT/{} rate: {}",
                local_currency.to_uppercase(),
                rate
            ))
            .into());
        }
        info!("Live USDT/{} rate: {}", local_currency.to_uppercase(), rate);

        Ok(Self::new(prices, rate, local_currency))
    }

    pub fn currency(&self, symbol: &str) -> Currency {
        Currency::classify(symbol, &self.local_currency)
    }

    pub fn local_currency(&self) -> &str {
        &self.local_currency
    }

    pub fn local_per_usdt(&self) -> Decimal {
        self.local_per_usdt
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// USD price of one unit. Parity for usd/usdt, 1/rate for the local fiat.
    pub fn price(&self, currency: &Currency) -> Result<Decimal> {
        match currency {
            Currency::Usd | Currency::Usdt => Ok(Decimal::ONE),
            Currency::Local => self.local_to_usd(Decimal::ONE),
            Currency::Asset(symbol) => self.prices.get(symbol).copied().ok_or_else(|| {
                BalanceError::UnsupportedAsset {
                    symbol: symbol.to_uppercase(),
                    supported: supported_symbols(),
                }
                .into()
            }),
        }
    }

    pub fn usd_price(&self, symbol: &str) -> Result<Decimal> {
        self.price(&self.currency(symbol))
    }

    pub fn usd_value(&self, symbol: &str, amount: Decimal) -> Result<Decimal> {
        match self.currency(symbol) {
            Currency::Local => self.local_to_usd(amount),
            currency => Ok(amount * self.price(&currency)?),
        }
    }

    fn local_to_usd(&self, amount: Decimal) -> Result<Decimal> {
        amount.checked_div(self.local_per_usdt).ok_or_else(|| {
            BalanceError::QuoteUnavailable(format!(
                "unusable USDT/{} rate: {}",
                self.local_currency.to_uppercase(),
                self.local_per_usdt
            ))
            .into()
        })
    }

    /// Convert a trade value quoted in `symbol` into USDT. Only cash
    /// currencies convert; anything else yields None.
    pub fn to_usdt(&self, symbol: &str, value: Decimal) -> Option<Decimal> {
        match self.currency(symbol) {
            Currency::Usd | Currency::Usdt => Some(value),
            Currency::Local => value.checked_div(self.local_per_usdt),
            Currency::Asset(_) => None,
        }
    }
}
