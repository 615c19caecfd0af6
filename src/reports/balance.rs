use std::collections::BTreeMap;

use anyhow::Result;
use itertools::Itertools;
use rust_decimal::Decimal;
use tracing::debug;

use crate::importers::{Conversion, Funding, LedgerRow, Trade, TradeSide, Withdrawal};
use crate::pricing::Quotes;

use super::cost_basis::{average_buy_price, CostBasis};

/// Per-currency running totals built by replaying the ledger once, in order
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    inflow: BTreeMap<String, Decimal>,
    outflow: BTreeMap<String, Decimal>,
    fees: BTreeMap<String, Decimal>,
    /// Deposits only; used for the invested total
    funding: BTreeMap<String, Decimal>,
    trades: Vec<Trade>,
    conversions: Vec<Conversion>,
}

fn credit(map: &mut BTreeMap<String, Decimal>, currency: &str, amount: Decimal) {
    *map.entry(currency.to_string()).or_default() += amount;
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay rows in the given order
    pub fn replay<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a LedgerRow>,
    {
        let mut ledger = Self::new();
        for row in rows {
            ledger.apply(row);
        }
        debug!(
            "Replayed ledger: {} trades, {} conversions, {} currencies",
            ledger.trades.len(),
            ledger.conversions.len(),
            ledger.currencies().len()
        );
        ledger
    }

    pub fn apply(&mut self, row: &LedgerRow) {
        match row {
            LedgerRow::Funding(funding) => self.apply_funding(funding),
            LedgerRow::Conversion(conversion) => {
                credit(&mut self.outflow, &conversion.from_currency, conversion.from_amount);
                credit(&mut self.inflow, &conversion.to_currency, conversion.to_amount);
                self.conversions.push(conversion.clone());
            }
            LedgerRow::Trade(trade) => self.apply_trade(trade),
            LedgerRow::Withdrawal(Withdrawal { currency, amount }) => {
                credit(&mut self.outflow, currency, *amount);
            }
        }
    }

    fn apply_funding(&mut self, funding: &Funding) {
        // Earnings report the gross amount; other deposits count their net
        // amount and only when positive
        let amount = if funding.method == "earnings" {
            funding.gross
        } else if funding.net_amount > Decimal::ZERO {
            funding.net_amount
        } else {
            return;
        };

        credit(&mut self.inflow, &funding.currency, amount);
        credit(&mut self.funding, &funding.currency, amount);
    }

    fn apply_trade(&mut self, trade: &Trade) {
        match trade.side {
            // Buy fees are charged in the acquired asset
            TradeSide::Buy => {
                credit(&mut self.inflow, &trade.major, trade.total);
                credit(&mut self.outflow, &trade.minor, trade.value);
                credit(&mut self.fees, &trade.major, trade.fee);
            }
            // Sell fees are charged in the received currency
            TradeSide::Sell => {
                credit(&mut self.outflow, &trade.major, trade.amount);
                credit(&mut self.inflow, &trade.minor, trade.total);
                credit(&mut self.fees, &trade.minor, trade.fee);
            }
        }
        self.trades.push(trade.clone());
    }

    pub fn inflow(&self, currency: &str) -> Decimal {
        self.inflow.get(currency).copied().unwrap_or_default()
    }

    pub fn outflow(&self, currency: &str) -> Decimal {
        self.outflow.get(currency).copied().unwrap_or_default()
    }

    pub fn fee(&self, currency: &str) -> Decimal {
        self.fees.get(currency).copied().unwrap_or_default()
    }

    pub fn funded(&self, currency: &str) -> Decimal {
        self.funding.get(currency).copied().unwrap_or_default()
    }

    /// inflow - outflow; negative when the ledger is inconsistent
    pub fn net_balance(&self, currency: &str) -> Decimal {
        self.inflow(currency) - self.outflow(currency)
    }

    /// Every currency that appears in inflow or outflow
    pub fn currencies(&self) -> Vec<&str> {
        self.inflow
            .keys()
            .merge(self.outflow.keys())
            .dedup()
            .map(String::as_str)
            .collect()
    }

    /// Net balance of every touched currency
    pub fn balances(&self) -> BTreeMap<String, Decimal> {
        self.currencies()
            .into_iter()
            .map(|c| (c.to_string(), self.net_balance(c)))
            .collect()
    }

    pub fn fees(&self) -> &BTreeMap<String, Decimal> {
        &self.fees
    }

    pub fn funding(&self) -> &BTreeMap<String, Decimal> {
        &self.funding
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn conversions(&self) -> &[Conversion] {
        &self.conversions
    }

    pub fn average_buy_price(&self, asset: &str, quotes: &Quotes) -> CostBasis {
        average_buy_price(&self.trades, asset, quotes)
    }

    /// Capital put in, valued at today's rates: local fiat through the live
    /// USDT rate, usd/usdt at parity and btc deposits at the current BTC price.
    pub fn total_invested(&self, quotes: &Quotes) -> Result<Decimal> {
        let local = quotes.local_currency();
        let mut total = quotes.usd_value(local, self.funded(local))?
            + self.funded("usdt")
            + self.funded("usd");

        let btc = self.funded("btc");
        if btc > Decimal::ZERO {
            total += quotes.usd_value("btc", btc)?;
        }

        Ok(total)
    }
}
