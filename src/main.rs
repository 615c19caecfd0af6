use anyhow::Result;
use balance::cli::Cli;
use balance::config::Config;
use balance::dispatcher::dispatch;
use balance::error::BalanceError;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout only carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli).await {
        eprintln!("\n{} {:#}", "Error:".red().bold(), e);
        if let Some(BalanceError::UnsupportedAsset { supported, .. }) =
            e.downcast_ref::<BalanceError>()
        {
            eprintln!("{}", format!("Supported coins: {}", supported).yellow());
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?.with_cli_overrides(cli.ledger_dir.clone(), cli.cold_wallet.clone());
    dispatch(cli.mode(), &config, cli.json).await
}
