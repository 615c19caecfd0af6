//! Balance - crypto portfolio tracker
//!
//! This library replays exchange ledger exports, merges them with manually
//! tracked cold wallet holdings and values the result at live USD prices.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod importers;
pub mod pricing;
pub mod reports;
pub mod utils;
pub mod wallet;
