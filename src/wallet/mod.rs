//! Cold wallet store
//!
//! Off-exchange holdings, kept in a small JSON object of lowercase symbol to
//! amount. Every mutation rewrites the whole file. There is no locking; the
//! store assumes a single process at a time.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::reports::DUST_THRESHOLD;

/// Symbol (lowercase) -> amount held off-exchange
pub type ColdHoldings = BTreeMap<String, Decimal>;

#[derive(Debug, Clone)]
pub struct ColdWalletStore {
    path: PathBuf,
}

impl ColdWalletStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all holdings; an absent file is an empty wallet
    pub fn load(&self) -> Result<ColdHoldings> {
        if !self.path.exists() {
            debug!("No cold wallet at {:?}", self.path);
            return Ok(ColdHoldings::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open cold wallet {:?}", self.path))?;
        let holdings: ColdHoldings = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse cold wallet {:?}", self.path))?;

        Ok(holdings)
    }

    /// Overwrite the file with `holdings`, pretty printed
    pub fn save(&self, holdings: &ColdHoldings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
        }

        let json = serde_json::to_string_pretty(holdings)?;
        let mut file = File::create(&self.path)
            .with_context(|| format!("Failed to write cold wallet {:?}", self.path))?;
        file.write_all(json.as_bytes())?;

        info!("Saved {} cold wallet entries to {:?}", holdings.len(), self.path);
        Ok(())
    }

    /// Add or replace the amount held for `symbol`
    pub fn upsert(&self, symbol: &str, amount: Decimal) -> Result<()> {
        let mut holdings = self.load()?;
        holdings.insert(symbol.to_lowercase(), amount);
        self.save(&holdings)
    }

    /// Remove `symbol`; false (and no write) when it was not present
    pub fn remove(&self, symbol: &str) -> Result<bool> {
        let mut holdings = self.load()?;
        if holdings.remove(&symbol.to_lowercase()).is_none() {
            return Ok(false);
        }
        self.save(&holdings)?;
        Ok(true)
    }

    /// Holdings above the dust threshold, sorted by symbol
    pub fn list(&self) -> Result<ColdHoldings> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|(_, amount)| *amount > DUST_THRESHOLD)
            .collect())
    }
}
