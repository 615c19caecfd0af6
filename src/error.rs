//! Error handling for the balance calculator
//!
//! Defines the domain error types and establishes a unified Result type
//! using anyhow for context chaining and error propagation.

use std::path::PathBuf;

use thiserror::Error;

/// Core error types for portfolio operations
#[derive(Error, Debug)]
pub enum BalanceError {
    #[error("quote unavailable: {0}")]
    QuoteUnavailable(String),

    #[error("ledger file missing: {}", .0.display())]
    LedgerFileMissing(PathBuf),

    #[error("no live price available for {symbol}")]
    UnsupportedAsset { symbol: String, supported: String },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for portfolio operations
pub type Result<T> = anyhow::Result<T>;
