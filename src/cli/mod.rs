use std::path::PathBuf;

use clap::Parser;

pub mod formatters;

#[derive(Parser, Debug)]
#[command(name = "balance")]
#[command(
    version,
    about = "Crypto portfolio tracker with live prices (CoinGecko + Bitso APIs)"
)]
#[command(
    long_about = "Replays exchange ledger exports (funding, conversions, trades, withdrawals), merges them with manually tracked cold wallet holdings and values everything at live USD prices."
)]
#[command(after_help = "Examples:
  # Show full portfolio report with live prices
  balance

  # Add or update a cold wallet holding
  balance --add-cold btc 0.01

  # Remove a cold wallet holding
  balance --remove-cold sol

  # List only the cold wallet
  balance --list-cold")]
pub struct Cli {
    /// Add or update cold wallet holding (e.g., --add-cold btc 0.01)
    #[arg(
        long = "add-cold",
        num_args = 2,
        value_names = ["CURRENCY", "AMOUNT"],
        allow_hyphen_values = true
    )]
    pub add_cold: Option<Vec<String>>,

    /// Remove cold wallet holding (e.g., --remove-cold btc)
    #[arg(long = "remove-cold", value_name = "CURRENCY")]
    pub remove_cold: Option<String>,

    /// Show only cold wallet holdings
    #[arg(long = "list-cold")]
    pub list_cold: bool,

    /// Directory holding funding.csv, conversion.csv, trade.csv and withdrawal.csv
    #[arg(long = "ledger-dir", value_name = "DIR")]
    pub ledger_dir: Option<PathBuf>,

    /// Cold wallet JSON file
    #[arg(long = "cold-wallet", value_name = "FILE")]
    pub cold_wallet: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Output the report in JSON format
    #[arg(long = "json")]
    pub json: bool,
}

/// What a single invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    AddCold { symbol: String, amount: String },
    RemoveCold(String),
    ListCold,
    Report,
}

impl Cli {
    /// Resolve the mode; when several flags are given the first of
    /// add, remove, list wins
    pub fn mode(&self) -> Mode {
        if let Some(args) = &self.add_cold {
            if let [symbol, amount] = args.as_slice() {
                return Mode::AddCold {
                    symbol: symbol.clone(),
                    amount: amount.clone(),
                };
            }
        }

        if let Some(symbol) = &self.remove_cold {
            return Mode::RemoveCold(symbol.clone());
        }

        if self.list_cold {
            return Mode::ListCold;
        }

        Mode::Report
    }
}
