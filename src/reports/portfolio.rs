use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::pricing::Quotes;
use crate::wallet::ColdHoldings;

use super::balance::Ledger;
use super::DUST_THRESHOLD;

/// Where a combined holding is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Location {
    Exchange,
    Cold,
    Both,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Exchange => "Exchange",
            Location::Cold => "Cold",
            Location::Both => "Both",
        }
    }
}

/// One row of a holdings table
#[derive(Debug, Clone, Serialize)]
pub struct HoldingRow {
    pub currency: String,
    pub exchange: Decimal,
    pub cold: Decimal,
    pub balance: Decimal,
    pub price: Decimal,
    pub usd_value: Decimal,
    pub portfolio_pct: Decimal,
    pub location: Location,
    /// usd/usdt/local fiat: displayed with 2 decimals
    pub is_cash: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PnlRow {
    pub currency: String,
    pub average_price: Decimal,
    pub current_price: Decimal,
    pub holdings: Decimal,
    pub unrealized_pnl: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeeRow {
    pub currency: String,
    pub amount: Decimal,
    pub usd_value: Decimal,
    pub is_cash: bool,
}

/// Deposited amounts (funding only) in their own units
#[derive(Debug, Clone, Serialize)]
pub struct Deposits {
    pub local_currency: String,
    pub local: Decimal,
    pub usdt: Decimal,
    pub btc: Decimal,
    pub local_per_usdt: Decimal,
}

/// Everything the renderer needs, computed up front so that a missing
/// price aborts before anything is printed
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioReport {
    pub generated_at: DateTime<Utc>,
    pub exchange_value: Decimal,
    pub cold_value: Decimal,
    pub total_value: Decimal,
    pub total_invested: Decimal,
    pub total_pnl: Decimal,
    pub roi_pct: Decimal,
    pub deposits: Deposits,
    pub exchange: Vec<HoldingRow>,
    /// None when the cold wallet has no entries at all
    pub cold: Option<Vec<HoldingRow>>,
    pub combined: Vec<HoldingRow>,
    pub average_buy: Vec<PnlRow>,
    pub fees: Vec<FeeRow>,
    pub total_fees: Decimal,
}

fn above_dust(holdings: &BTreeMap<String, Decimal>) -> BTreeMap<String, Decimal> {
    holdings
        .iter()
        .filter(|(_, amount)| **amount > DUST_THRESHOLD)
        .map(|(currency, amount)| (currency.clone(), *amount))
        .collect()
}

fn percent_of(value: Decimal, total: Decimal) -> Decimal {
    if total > Decimal::ZERO {
        value / total * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

fn sort_by_value_desc(rows: &mut [HoldingRow]) {
    rows.sort_by(|a, b| b.usd_value.cmp(&a.usd_value));
}

/// Build holding rows; the percentage column is filled in once the
/// portfolio total is known
fn holding_rows(
    exchange: &BTreeMap<String, Decimal>,
    cold: &BTreeMap<String, Decimal>,
    quotes: &Quotes,
) -> Result<Vec<HoldingRow>> {
    let currencies: Vec<&String> = exchange.keys().merge(cold.keys()).dedup().collect();

    let mut rows = Vec::with_capacity(currencies.len());
    for currency in currencies {
        let on_exchange = exchange.get(currency).copied().unwrap_or_default();
        let in_cold = cold.get(currency).copied().unwrap_or_default();
        let balance = on_exchange + in_cold;

        let location = match (on_exchange > Decimal::ZERO, in_cold > Decimal::ZERO) {
            (true, true) => Location::Both,
            (true, false) => Location::Exchange,
            _ => Location::Cold,
        };

        rows.push(HoldingRow {
            currency: currency.clone(),
            exchange: on_exchange,
            cold: in_cold,
            balance,
            price: quotes.usd_price(currency)?,
            usd_value: quotes.usd_value(currency, balance)?,
            portfolio_pct: Decimal::ZERO,
            location,
            is_cash: quotes.currency(currency).is_cash(),
        });
    }

    sort_by_value_desc(&mut rows);
    Ok(rows)
}

/// Value the replayed ledger plus cold wallet at live quotes.
/// Fails on the first currency without a quote.
pub fn calculate_portfolio(
    ledger: &Ledger,
    cold_wallet: &ColdHoldings,
    quotes: &Quotes,
) -> Result<PortfolioReport> {
    let empty = BTreeMap::new();
    let exchange_balances = above_dust(&ledger.balances());
    let cold_balances = above_dust(cold_wallet);

    let mut exchange = holding_rows(&exchange_balances, &empty, quotes)?;
    let mut cold = holding_rows(&empty, &cold_balances, quotes)?;
    let mut combined = holding_rows(&exchange_balances, &cold_balances, quotes)?;

    let exchange_value: Decimal = exchange.iter().map(|r| r.usd_value).sum();
    let cold_value: Decimal = cold.iter().map(|r| r.usd_value).sum();
    let total_value = exchange_value + cold_value;

    for row in exchange
        .iter_mut()
        .chain(cold.iter_mut())
        .chain(combined.iter_mut())
    {
        row.portfolio_pct = percent_of(row.usd_value, total_value);
    }

    let total_invested = ledger.total_invested(quotes)?;
    let total_pnl = total_value - total_invested;
    let roi_pct = percent_of(total_pnl, total_invested);

    // Cost basis comes from exchange trades only but is applied to the
    // combined holding
    let mut average_buy = Vec::new();
    for row in combined.iter().filter(|r| !r.is_cash) {
        let cost = ledger.average_buy_price(&row.currency, quotes);
        if cost.average_price > Decimal::ZERO && row.price > Decimal::ZERO {
            average_buy.push(PnlRow {
                currency: row.currency.clone(),
                average_price: cost.average_price,
                current_price: row.price,
                holdings: row.balance,
                unrealized_pnl: (row.price - cost.average_price) * row.balance,
            });
        }
    }

    let mut fees = Vec::new();
    for (currency, amount) in above_dust(ledger.fees()) {
        fees.push(FeeRow {
            usd_value: quotes.usd_value(&currency, amount)?,
            is_cash: quotes.currency(&currency).is_cash(),
            currency,
            amount,
        });
    }
    let total_fees: Decimal = fees.iter().map(|f| f.usd_value).sum();

    let local = quotes.local_currency();
    let deposits = Deposits {
        local_currency: local.to_string(),
        local: ledger.funded(local),
        usdt: ledger.funded("usdt"),
        btc: ledger.funded("btc"),
        local_per_usdt: quotes.local_per_usdt(),
    };

    Ok(PortfolioReport {
        generated_at: Utc::now(),
        exchange_value,
        cold_value,
        total_value,
        total_invested,
        total_pnl,
        roi_pct,
        deposits,
        exchange,
        cold: (!cold_wallet.is_empty()).then_some(cold),
        combined,
        average_buy,
        fees,
        total_fees,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importers::{Funding, LedgerRow, Trade, TradeSide, Withdrawal};
    use crate::pricing::PriceTable;
    use rust_decimal_macros::dec;

    fn quotes() -> Quotes {
        let prices: PriceTable = [
            ("btc".to_string(), dec!(60000)),
            ("eth".to_string(), dec!(3000)),
            ("doge".to_string(), dec!(0.1)),
        ]
        .into_iter()
        .collect();
        Quotes::new(prices, dec!(20), "mxn")
    }

    fn sample_ledger() -> Ledger {
        Ledger::replay(&[
            LedgerRow::Funding(Funding {
                method: "earnings".to_string(),
                currency: "usdt".to_string(),
                gross: dec!(1000),
                net_amount: Decimal::ZERO,
            }),
            LedgerRow::Trade(Trade {
                side: TradeSide::Buy,
                major: "btc".to_string(),
                minor: "usdt".to_string(),
                amount: dec!(0.01),
                value: dec!(500),
                fee: dec!(0.00001),
                total: dec!(0.01),
                rate: dec!(50000),
            }),
            LedgerRow::Trade(Trade {
                side: TradeSide::Buy,
                major: "eth".to_string(),
                minor: "usdt".to_string(),
                amount: dec!(0.1),
                value: dec!(200),
                fee: dec!(0.0001),
                total: dec!(0.1),
                rate: dec!(2000),
            }),
            // leaves 0.000001 btc of dust on the exchange
            LedgerRow::Withdrawal(Withdrawal {
                currency: "btc".to_string(),
                amount: dec!(0.009999),
            }),
        ])
    }

    #[test]
    fn test_totals_and_dust_filtering() {
        let cold: ColdHoldings = [
            ("btc".to_string(), dec!(0.01)),
            ("doge".to_string(), dec!(0.000001)),
        ]
        .into_iter()
        .collect();

        let report = calculate_portfolio(&sample_ledger(), &cold, &quotes()).unwrap();

        // exchange: usdt 300 + eth 0.1 * 3000; btc dust excluded
        assert_eq!(report.exchange_value, dec!(600));
        assert_eq!(
            report.exchange.iter().map(|r| r.currency.as_str()).collect::<Vec<_>>(),
            vec!["eth", "usdt"]
        );
        assert_eq!(report.cold_value, dec!(600));
        assert_eq!(report.total_value, dec!(1200));

        let cold_rows = report.cold.as_ref().unwrap();
        assert_eq!(cold_rows.len(), 1);
        assert_eq!(cold_rows[0].currency, "btc");

        assert!(report
            .combined
            .iter()
            .all(|row| row.balance > DUST_THRESHOLD));
    }

    #[test]
    fn test_combined_rows_sorted_with_location() {
        let cold: ColdHoldings = [
            ("btc".to_string(), dec!(0.01)),
            ("eth".to_string(), dec!(0.1)),
        ]
        .into_iter()
        .collect();

        let report = calculate_portfolio(&sample_ledger(), &cold, &quotes()).unwrap();
        let combined: Vec<_> = report
            .combined
            .iter()
            .map(|r| (r.currency.as_str(), r.location, r.usd_value))
            .collect();

        assert_eq!(
            combined,
            vec![
                ("btc", Location::Cold, dec!(600)),
                ("eth", Location::Both, dec!(600)),
                ("usdt", Location::Exchange, dec!(300)),
            ]
        );
        assert_eq!(report.combined[2].portfolio_pct, dec!(20));
    }

    #[test]
    fn test_pnl_uses_combined_holdings() {
        let cold: ColdHoldings = [("eth".to_string(), dec!(0.4))].into_iter().collect();
        let report = calculate_portfolio(&sample_ledger(), &cold, &quotes()).unwrap();

        assert_eq!(report.average_buy.len(), 1);
        let eth = &report.average_buy[0];
        assert_eq!(eth.currency, "eth");
        assert_eq!(eth.average_price, dec!(2000));
        assert_eq!(eth.holdings, dec!(0.5));
        assert_eq!(eth.unrealized_pnl, dec!(500));
    }

    #[test]
    fn test_cold_only_asset_is_left_out_of_pnl() {
        let cold: ColdHoldings = [("doge".to_string(), dec!(1000))].into_iter().collect();
        let report = calculate_portfolio(&sample_ledger(), &cold, &quotes()).unwrap();

        assert!(report.combined.iter().any(|r| r.currency == "doge"));
        assert!(report.average_buy.iter().all(|r| r.currency != "doge"));
    }

    #[test]
    fn test_invested_pnl_and_roi() {
        let report = calculate_portfolio(&sample_ledger(), &ColdHoldings::new(), &quotes()).unwrap();

        assert_eq!(report.total_invested, dec!(1000));
        assert_eq!(report.total_pnl, dec!(-400));
        assert_eq!(report.roi_pct, dec!(-40));
        assert!(report.cold.is_none());
    }

    #[test]
    fn test_fees_skip_dust_and_are_valued() {
        let report = calculate_portfolio(&sample_ledger(), &ColdHoldings::new(), &quotes()).unwrap();

        // btc fee of 0.00001 is dust
        assert_eq!(report.fees.len(), 1);
        assert_eq!(report.fees[0].currency, "eth");
        assert_eq!(report.fees[0].usd_value, dec!(0.3));
        assert_eq!(report.total_fees, dec!(0.3));
    }

    #[test]
    fn test_unknown_asset_aborts_report() {
        let cold: ColdHoldings = [("pepe".to_string(), dec!(1000000))].into_iter().collect();
        assert!(calculate_portfolio(&sample_ledger(), &cold, &quotes()).is_err());
    }
}
