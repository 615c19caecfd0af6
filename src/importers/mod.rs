// Import module - exchange ledger CSV exports

pub mod ledger_csv;

use anyhow::Result;
use std::path::Path;
use tracing::info;

pub use ledger_csv::{
    parse_amount, read_conversions, read_funding, read_trades, read_withdrawals, Conversion,
    Funding, LedgerRow, Trade, TradeSide, Withdrawal,
};

pub const FUNDING_FILE: &str = "funding.csv";
pub const CONVERSION_FILE: &str = "conversion.csv";
pub const TRADE_FILE: &str = "trade.csv";
pub const WITHDRAWAL_FILE: &str = "withdrawal.csv";

/// Read the four ledger exports from `dir` in replay order:
/// funding, conversions, trades, withdrawals. A missing file aborts.
pub fn read_ledger_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<LedgerRow>> {
    let dir = dir.as_ref();
    info!("Reading ledger exports from {:?}", dir);

    let mut rows = read_funding(dir.join(FUNDING_FILE))?;
    rows.extend(read_conversions(dir.join(CONVERSION_FILE))?);
    rows.extend(read_trades(dir.join(TRADE_FILE))?);
    rows.extend(read_withdrawals(dir.join(WITHDRAWAL_FILE))?);

    Ok(rows)
}
