//! Report pipeline tests: fixture ledgers in a temp dir valued with fixed quotes

use anyhow::Result;
use balance::config::Config;
use balance::dispatcher::build_report;
use balance::error::BalanceError;
use balance::pricing::{PriceTable, QuoteSource};
use balance::reports::portfolio::Location;
use balance::wallet::ColdWalletStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

mod cli_helpers;
use cli_helpers::write_ledger;

/// Fixed quotes: BTC 60000, ETH 3000, 20 MXN per USDT
struct FixedQuotes {
    prices: PriceTable,
    rate: Decimal,
}

impl FixedQuotes {
    fn standard() -> Self {
        Self {
            prices: [
                ("btc".to_string(), dec!(60000)),
                ("eth".to_string(), dec!(3000)),
            ]
            .into_iter()
            .collect(),
            rate: dec!(20),
        }
    }
}

impl QuoteSource for FixedQuotes {
    async fn get_spot_prices(&self) -> Result<PriceTable> {
        Ok(self.prices.clone())
    }

    async fn get_local_to_usdt_rate(&self) -> Result<Decimal> {
        Ok(self.rate)
    }
}

fn config_for(dir: &TempDir) -> Config {
    Config {
        ledger_dir: dir.path().join("ledger"),
        cold_wallet_path: dir.path().join("cold_wallet.json"),
        ..Config::default()
    }
}

/// 20000 MXN deposited, 10 USDT of earnings, 0.01 BTC bought for 10000 MXN
fn write_standard_ledger(dir: &TempDir) {
    write_ledger(
        &dir.path().join("ledger"),
        "spei,mxn,20000,20000\nearnings,usdt,10,0\n",
        "",
        "buy,btc,mxn,0.0101,10000,0.0001,0.01,990099\n",
        "",
    );
}

#[tokio::test]
async fn report_values_exchange_and_cold_holdings() {
    let dir = TempDir::new().unwrap();
    write_standard_ledger(&dir);
    let config = config_for(&dir);
    ColdWalletStore::new(&config.cold_wallet_path)
        .upsert("ETH", dec!(1))
        .unwrap();

    let report = build_report(&FixedQuotes::standard(), &config, false)
        .await
        .unwrap();

    // mxn 10000 / 20 + usdt 10 + btc 0.01 * 60000
    assert_eq!(report.exchange_value, dec!(1110));
    assert_eq!(report.cold_value, dec!(3000));
    assert_eq!(report.total_value, dec!(4110));

    // 20000 / 20 + 10
    assert_eq!(report.total_invested, dec!(1010));
    assert_eq!(report.total_pnl, dec!(3100));

    assert_eq!(report.deposits.local, dec!(20000));
    assert_eq!(report.deposits.usdt, dec!(10));
    assert_eq!(report.deposits.local_per_usdt, dec!(20));

    let currencies: Vec<_> = report
        .exchange
        .iter()
        .map(|r| r.currency.as_str())
        .collect();
    assert_eq!(currencies, vec!["btc", "mxn", "usdt"]);

    let eth = report
        .combined
        .iter()
        .find(|r| r.currency == "eth")
        .unwrap();
    assert_eq!(eth.location, Location::Cold);
    assert!(report.cold.is_some());
}

#[tokio::test]
async fn report_average_buy_and_fees() {
    let dir = TempDir::new().unwrap();
    write_standard_ledger(&dir);

    let report = build_report(&FixedQuotes::standard(), &config_for(&dir), false)
        .await
        .unwrap();

    assert_eq!(report.average_buy.len(), 1);
    let btc = &report.average_buy[0];
    assert_eq!(btc.currency, "btc");
    // 10000 MXN at 20 = 500 USDT for 0.01 BTC
    assert_eq!(btc.average_price, dec!(50000));
    assert_eq!(btc.unrealized_pnl, dec!(100));

    assert_eq!(report.fees.len(), 1);
    assert_eq!(report.fees[0].currency, "btc");
    assert_eq!(report.fees[0].usd_value, dec!(6));
    assert_eq!(report.total_fees, dec!(6));
    assert!(report.cold.is_none());
}

#[tokio::test]
async fn empty_price_table_fails_before_ledger_is_read() {
    let dir = TempDir::new().unwrap();
    // no ledger files written at all
    let source = FixedQuotes {
        prices: PriceTable::new(),
        rate: dec!(20),
    };

    let err = build_report(&source, &config_for(&dir), false)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BalanceError>(),
        Some(BalanceError::QuoteUnavailable(_))
    ));
}

#[tokio::test]
async fn non_positive_rate_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_standard_ledger(&dir);
    let source = FixedQuotes {
        rate: Decimal::ZERO,
        ..FixedQuotes::standard()
    };

    let err = build_report(&source, &config_for(&dir), false)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BalanceError>(),
        Some(BalanceError::QuoteUnavailable(_))
    ));
}

#[tokio::test]
async fn missing_ledger_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_standard_ledger(&dir);
    std::fs::remove_file(dir.path().join("ledger").join("trade.csv")).unwrap();

    let err = build_report(&FixedQuotes::standard(), &config_for(&dir), false)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BalanceError>(),
        Some(BalanceError::LedgerFileMissing(path)) if path.ends_with("trade.csv")
    ));
}

#[tokio::test]
async fn cold_asset_without_price_aborts_report() {
    let dir = TempDir::new().unwrap();
    write_standard_ledger(&dir);
    let config = config_for(&dir);
    ColdWalletStore::new(&config.cold_wallet_path)
        .upsert("pepe", dec!(1000))
        .unwrap();

    let err = build_report(&FixedQuotes::standard(), &config, false)
        .await
        .unwrap_err();

    match err.downcast_ref::<BalanceError>() {
        Some(BalanceError::UnsupportedAsset { symbol, supported }) => {
            assert_eq!(symbol, "PEPE");
            assert!(supported.contains("BTC"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn sells_and_withdrawals_reduce_exchange_balance() {
    let dir = TempDir::new().unwrap();
    write_ledger(
        &dir.path().join("ledger"),
        "spei,mxn,0,0\nearnings,usdt,1000,0\n",
        "",
        "buy,eth,usdt,0.2,500,0,0.2,2500\nsell,eth,usdt,0.1,300,0.3,299.7,3000\n",
        "eth,0.05\n",
    );

    let report = build_report(&FixedQuotes::standard(), &config_for(&dir), false)
        .await
        .unwrap();

    let eth = report
        .exchange
        .iter()
        .find(|r| r.currency == "eth")
        .unwrap();
    assert_eq!(eth.balance, dec!(0.05));

    let usdt = report
        .exchange
        .iter()
        .find(|r| r.currency == "usdt")
        .unwrap();
    // 1000 - 500 + 299.7
    assert_eq!(usdt.balance, dec!(799.7));

    // average stays at 2500 after selling half
    assert_eq!(report.average_buy[0].average_price, dec!(2500));
    assert_eq!(report.total_invested, dec!(1000));
}
