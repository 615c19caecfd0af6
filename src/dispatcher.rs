//! Command dispatcher that routes the resolved CLI mode to its handler.
//!
//! Cold wallet maintenance never touches the network. The report path
//! resolves every quote before reading the ledger so that an outage fails
//! fast, and builds the whole `PortfolioReport` before printing anything.

use std::str::FromStr;

use anyhow::{Context, Result};
use colored::Colorize;
use rust_decimal::Decimal;
use tracing::info;

use crate::cli::formatters::{
    format_cold_wallet, format_empty_cold_wallet, format_report, format_report_json,
};
use crate::cli::Mode;
use crate::config::Config;
use crate::error::BalanceError;
use crate::importers::read_ledger_dir;
use crate::pricing::{LiveQuoteSource, QuoteSource, Quotes};
use crate::reports::{calculate_portfolio, Ledger, PortfolioReport};
use crate::wallet::ColdWalletStore;

/// Route a parsed mode to its handler
pub async fn dispatch(mode: Mode, config: &Config, json_output: bool) -> Result<()> {
    match mode {
        Mode::AddCold { symbol, amount } => dispatch_add_cold(config, &symbol, &amount),
        Mode::RemoveCold(symbol) => dispatch_remove_cold(config, &symbol),
        Mode::ListCold => dispatch_list_cold(config),
        Mode::Report => {
            let source = LiveQuoteSource::new(config)?;
            dispatch_report(&source, config, json_output).await
        }
    }
}

/// Parse a user supplied cold wallet amount. Plain and scientific
/// notation are accepted.
pub fn parse_cold_amount(raw: &str) -> Result<Decimal, BalanceError> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| BalanceError::InvalidAmount(raw.to_string()))
}

fn dispatch_add_cold(config: &Config, symbol: &str, amount: &str) -> Result<()> {
    let amount = match parse_cold_amount(amount) {
        Ok(amount) => amount,
        Err(e) => {
            // Reported, not fatal: nothing is written
            println!("{} {}", "✗".red().bold(), e.to_string().red());
            return Ok(());
        }
    };

    let store = ColdWalletStore::new(&config.cold_wallet_path);
    store.upsert(symbol, amount)?;

    println!(
        "{}",
        format!("Added/Updated: {} = {}", symbol.to_uppercase(), amount.normalize()).green()
    );
    Ok(())
}

fn dispatch_remove_cold(config: &Config, symbol: &str) -> Result<()> {
    let store = ColdWalletStore::new(&config.cold_wallet_path);

    if store.remove(symbol)? {
        println!("{}", format!("Removed: {}", symbol.to_uppercase()).green());
    } else {
        println!(
            "{}",
            format!("{} not found in cold wallet", symbol.to_uppercase()).red()
        );
    }
    Ok(())
}

fn dispatch_list_cold(config: &Config) -> Result<()> {
    let store = ColdWalletStore::new(&config.cold_wallet_path);

    // Emptiness is judged on the stored map, the table on non-dust entries
    if store.load()?.is_empty() {
        print!("{}", format_empty_cold_wallet());
        return Ok(());
    }

    print!("{}", format_cold_wallet(&store.list()?, &config.local_currency));
    Ok(())
}

async fn dispatch_report<Q: QuoteSource>(
    source: &Q,
    config: &Config,
    json_output: bool,
) -> Result<()> {
    let report = build_report(source, config, !json_output).await?;

    if json_output {
        println!("{}", format_report_json(&report)?);
    } else {
        print!("{}", format_report(&report));
    }
    Ok(())
}

/// Fetch quotes, replay the ledger, load the cold wallet and value
/// everything. Nothing is printed to stdout; with `verbose` the fetch
/// progress goes to stderr.
pub async fn build_report<Q: QuoteSource>(
    source: &Q,
    config: &Config,
    verbose: bool,
) -> Result<PortfolioReport> {
    if verbose {
        eprintln!("{}", "Fetching live prices and exchange rate...".cyan());
    }

    let quotes = Quotes::fetch(source, &config.local_currency).await?;

    if verbose {
        eprintln!(
            "{}",
            format!("Fetched prices for {} cryptocurrencies", quotes.prices().len()).green()
        );
        eprintln!(
            "{}",
            format!(
                "Live USDT/{} rate: {}\n",
                quotes.local_currency().to_uppercase(),
                crate::utils::format_fixed(quotes.local_per_usdt(), 2)
            )
            .green()
        );
    }

    let rows = read_ledger_dir(&config.ledger_dir)?;
    let ledger = Ledger::replay(&rows);
    info!(
        "Replayed {} ledger rows across {} currencies",
        rows.len(),
        ledger.currencies().len()
    );

    let cold_wallet = ColdWalletStore::new(&config.cold_wallet_path)
        .load()
        .context("Failed to load cold wallet")?;

    calculate_portfolio(&ledger, &cold_wallet, &quotes)
}
