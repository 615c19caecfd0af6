#![allow(dead_code)]

use anyhow::{bail, Result};
use assert_cmd::cargo;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

pub const FUNDING_HEADER: &str = "method,currency,gross,net amount\n";
pub const CONVERSION_HEADER: &str = "from_currency,from_amount,to_currency,to_amount\n";
pub const TRADE_HEADER: &str = "type,major,minor,amount,value,fee,total,rate\n";
pub const WITHDRAWAL_HEADER: &str = "currency,amount\n";

/// Command running in `workdir`, with no color and no inherited overrides
pub fn base_cmd(workdir: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("balance"));
    cmd.current_dir(workdir.path());
    for key in [
        "BALANCE_CONFIG",
        "BALANCE_LEDGER_DIR",
        "BALANCE_COLD_WALLET",
        "BALANCE_COINGECKO_URL",
        "BALANCE_BITSO_URL",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd.arg("--no-color");
    cmd
}

pub fn run_cmd(workdir: &TempDir, args: &[&str]) -> Result<Output> {
    let mut cmd = base_cmd(workdir);
    cmd.args(args);
    let output = cmd.output()?;
    if !output.status.success() {
        bail!(
            "command failed: {:?}\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

/// Write the four ledger exports into `dir`; each body is appended to its header
pub fn write_ledger(dir: &Path, funding: &str, conversions: &str, trades: &str, withdrawals: &str) {
    std::fs::create_dir_all(dir).expect("failed to create ledger dir");
    let files = [
        ("funding.csv", FUNDING_HEADER, funding),
        ("conversion.csv", CONVERSION_HEADER, conversions),
        ("trade.csv", TRADE_HEADER, trades),
        ("withdrawal.csv", WITHDRAWAL_HEADER, withdrawals),
    ];
    for (name, header, body) in files {
        std::fs::write(dir.join(name), format!("{}{}", header, body))
            .expect("failed to write ledger fixture");
    }
}
