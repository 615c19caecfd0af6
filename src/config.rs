//! Runtime configuration
//!
//! Settings come from built-in defaults, an optional `balance.toml`, then
//! `BALANCE_*` environment variables, and finally CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::pricing::{bitso, coingecko};

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "balance.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding funding.csv, conversion.csv, trade.csv, withdrawal.csv
    pub ledger_dir: PathBuf,
    pub cold_wallet_path: PathBuf,
    /// Fiat currency quoted against USDT (lowercase symbol)
    pub local_currency: String,
    pub coingecko_url: String,
    pub bitso_url: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_dir: PathBuf::from("."),
            cold_wallet_path: PathBuf::from("cold_wallet.json"),
            local_currency: "mxn".to_string(),
            coingecko_url: coingecko::DEFAULT_URL.to_string(),
            bitso_url: bitso::DEFAULT_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from the config file (if any) and the process environment
    pub fn load() -> Result<Self> {
        let path = std::env::var("BALANCE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE));

        let mut config = if path.exists() {
            info!("Loading configuration from {:?}", path);
            Self::from_file(&path)?
        } else {
            debug!("No config file at {:?}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.local_currency = config.local_currency.to_lowercase();
        Ok(config)
    }

    /// Apply `BALANCE_*` overrides using the given variable lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("BALANCE_LEDGER_DIR") {
            self.ledger_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("BALANCE_COLD_WALLET") {
            self.cold_wallet_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("BALANCE_COINGECKO_URL") {
            self.coingecko_url = url;
        }
        if let Some(url) = lookup("BALANCE_BITSO_URL") {
            self.bitso_url = url;
        }
    }

    /// CLI flags take precedence over everything else
    pub fn with_cli_overrides(
        mut self,
        ledger_dir: Option<PathBuf>,
        cold_wallet: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = ledger_dir {
            self.ledger_dir = dir;
        }
        if let Some(path) = cold_wallet {
            self.cold_wallet_path = path;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.ledger_dir, PathBuf::from("."));
        assert_eq!(config.cold_wallet_path, PathBuf::from("cold_wallet.json"));
        assert_eq!(config.local_currency, "mxn");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            ledger_dir = "exports/2025"
            local_currency = "ARS"
            "#,
        )
        .unwrap();

        assert_eq!(config.ledger_dir, PathBuf::from("exports/2025"));
        assert_eq!(config.local_currency, "ars");
        assert_eq!(config.cold_wallet_path, PathBuf::from("cold_wallet.json"));
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml_str("timeout_secs = \"soon\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BALANCE_LEDGER_DIR", "/tmp/ledger"),
            ("BALANCE_COINGECKO_URL", "http://127.0.0.1:9/price"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.ledger_dir, PathBuf::from("/tmp/ledger"));
        assert_eq!(config.coingecko_url, "http://127.0.0.1:9/price");
        assert_eq!(config.bitso_url, bitso::DEFAULT_URL);
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| {
            (key == "BALANCE_COLD_WALLET").then(|| "env_wallet.json".to_string())
        });
        let config = config.with_cli_overrides(None, Some(PathBuf::from("cli_wallet.json")));

        assert_eq!(config.cold_wallet_path, PathBuf::from("cli_wallet.json"));
        assert_eq!(config.ledger_dir, PathBuf::from("."));
    }
}
