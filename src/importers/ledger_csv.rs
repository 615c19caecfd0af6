use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::BalanceError;

/// Deposit into the exchange (bank transfer, crypto deposit, earnings...)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Funding {
    pub method: String,
    pub currency: String,
    pub gross: Decimal,
    pub net_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub from_currency: String,
    pub from_amount: Decimal,
    pub to_currency: String,
    pub to_amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Anything that is not "buy" is a sell
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("buy") {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        }
    }
}

/// Trade on a `major_minor` book: `major` is the asset, `minor` the quote currency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub side: TradeSide,
    pub major: String,
    pub minor: String,
    pub amount: Decimal,
    pub value: Decimal,
    pub fee: Decimal,
    pub total: Decimal,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Withdrawal {
    pub currency: String,
    pub amount: Decimal,
}

/// One normalized ledger row
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerRow {
    Funding(Funding),
    Conversion(Conversion),
    Trade(Trade),
    Withdrawal(Withdrawal),
}

#[derive(Debug, Deserialize)]
struct FundingRecord {
    #[serde(default)]
    method: String,
    #[serde(default)]
    currency: String,
    #[serde(default)]
    gross: String,
    #[serde(default, rename = "net amount")]
    net_amount: String,
}

#[derive(Debug, Deserialize)]
struct ConversionRecord {
    #[serde(default)]
    from_currency: String,
    #[serde(default)]
    from_amount: String,
    #[serde(default)]
    to_currency: String,
    #[serde(default)]
    to_amount: String,
}

#[derive(Debug, Deserialize)]
struct TradeRecord {
    #[serde(default, rename = "type")]
    side: String,
    #[serde(default)]
    major: String,
    #[serde(default)]
    minor: String,
    #[serde(default)]
    amount: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    fee: String,
    #[serde(default)]
    total: String,
    #[serde(default)]
    rate: String,
}

#[derive(Debug, Deserialize)]
struct WithdrawalRecord {
    #[serde(default)]
    currency: String,
    #[serde(default)]
    amount: String,
}

/// Parse a ledger amount. Returns zero for anything that is not a number
/// (empty cells, "N/A", NaN...), so a bad cell never rejects its row.
pub fn parse_amount(raw: &str) -> Decimal {
    let text = raw.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}

fn symbol(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn read_funding<P: AsRef<Path>>(path: P) -> Result<Vec<LedgerRow>> {
    read_records(path.as_ref(), |r: FundingRecord| {
        LedgerRow::Funding(Funding {
            method: symbol(&r.method),
            currency: symbol(&r.currency),
            gross: parse_amount(&r.gross),
            net_amount: parse_amount(&r.net_amount),
        })
    })
}

pub fn read_conversions<P: AsRef<Path>>(path: P) -> Result<Vec<LedgerRow>> {
    read_records(path.as_ref(), |r: ConversionRecord| {
        LedgerRow::Conversion(Conversion {
            from_currency: symbol(&r.from_currency),
            from_amount: parse_amount(&r.from_amount),
            to_currency: symbol(&r.to_currency),
            to_amount: parse_amount(&r.to_amount),
        })
    })
}

pub fn read_trades<P: AsRef<Path>>(path: P) -> Result<Vec<LedgerRow>> {
    read_records(path.as_ref(), |r: TradeRecord| {
        LedgerRow::Trade(Trade {
            side: TradeSide::parse(&r.side),
            major: symbol(&r.major),
            minor: symbol(&r.minor),
            amount: parse_amount(&r.amount),
            value: parse_amount(&r.value),
            fee: parse_amount(&r.fee),
            total: parse_amount(&r.total),
            rate: parse_amount(&r.rate),
        })
    })
}

pub fn read_withdrawals<P: AsRef<Path>>(path: P) -> Result<Vec<LedgerRow>> {
    read_records(path.as_ref(), |r: WithdrawalRecord| {
        LedgerRow::Withdrawal(Withdrawal {
            currency: symbol(&r.currency),
            amount: parse_amount(&r.amount),
        })
    })
}

/// Read a headed CSV in file order, converting each record with `convert`.
/// Records that cannot be decoded at all are skipped with a warning.
fn read_records<R, F>(path: &Path, convert: F) -> Result<Vec<LedgerRow>>
where
    R: DeserializeOwned,
    F: Fn(R) -> LedgerRow,
{
    info!("Parsing ledger file: {:?}", path);

    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => BalanceError::LedgerFileMissing(path.to_path_buf()),
        _ => BalanceError::Io(e),
    })?;

    let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV headers of {:?}", path))?
        .clone();
    debug!("CSV headers: {:?}", headers);

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<R>().enumerate() {
        match result {
            Ok(record) => rows.push(convert(record)),
            Err(e) => {
                warn!("Skipping row {} of {:?}: {}", idx + 2, path, e);
                continue;
            }
        }
    }

    info!("Read {} rows from {:?}", rows.len(), path);
    Ok(rows)
}
