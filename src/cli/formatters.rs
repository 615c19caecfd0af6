//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation. Every function
//! takes an already computed value and returns a `String`.

use crate::pricing::Currency;
use crate::reports::portfolio::{FeeRow, HoldingRow, PnlRow};
use crate::reports::PortfolioReport;
use crate::utils::{
    format_amount, format_fixed, format_price, format_signed_pct, format_signed_usd, format_usd,
    format_with_separators,
};
use crate::wallet::ColdHoldings;
use anyhow::Result;
use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

#[derive(Tabled)]
struct HoldingLine {
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Price (USD)")]
    price: String,
    #[tabled(rename = "USD Value")]
    usd_value: String,
    #[tabled(rename = "% Total")]
    pct: String,
}

#[derive(Tabled)]
struct CombinedLine {
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Total Balance")]
    balance: String,
    #[tabled(rename = "Price (USD)")]
    price: String,
    #[tabled(rename = "USD Value")]
    usd_value: String,
    #[tabled(rename = "% Portfolio")]
    pct: String,
    #[tabled(rename = "Location")]
    location: String,
}

#[derive(Tabled)]
struct PnlLine {
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Avg Buy Price")]
    average_price: String,
    #[tabled(rename = "Current Price")]
    current_price: String,
    #[tabled(rename = "Total Holdings")]
    holdings: String,
    #[tabled(rename = "Unrealized P&L")]
    pnl: String,
}

#[derive(Tabled)]
struct FeeLine {
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Fees")]
    amount: String,
    #[tabled(rename = "USD Value")]
    usd_value: String,
}

#[derive(Tabled)]
struct DepositLine {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

#[derive(Tabled)]
struct ColdLine {
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

fn section_title(title: &str) -> String {
    format!("{}\n", title.cyan().bold())
}

/// Rounded table with every column but the first right-aligned
fn render_table(mut table: Table) -> String {
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

fn colored_pnl(value: Decimal, text: String) -> String {
    if value >= Decimal::ZERO {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

fn holding_line(row: &HoldingRow) -> HoldingLine {
    HoldingLine {
        currency: row.currency.to_uppercase(),
        balance: format_amount(row.balance, row.is_cash),
        price: format_price(row.price),
        usd_value: format_usd(row.usd_value),
        pct: format!("{}%", format_fixed(row.portfolio_pct, 1)),
    }
}

fn combined_line(row: &HoldingRow) -> CombinedLine {
    CombinedLine {
        currency: row.currency.to_uppercase(),
        balance: format_amount(row.balance, row.is_cash),
        price: format_price(row.price),
        usd_value: format_usd(row.usd_value),
        pct: format!("{}%", format_fixed(row.portfolio_pct, 1)),
        location: row.location.as_str().to_string(),
    }
}

fn pnl_line(row: &PnlRow) -> PnlLine {
    PnlLine {
        asset: row.currency.to_uppercase(),
        average_price: format_usd(row.average_price),
        current_price: format_usd(row.current_price),
        holdings: format_fixed(row.holdings, 8),
        pnl: colored_pnl(row.unrealized_pnl, format_signed_usd(row.unrealized_pnl)),
    }
}

fn fee_line(row: &FeeRow) -> FeeLine {
    FeeLine {
        currency: row.currency.to_uppercase(),
        amount: format_amount(row.amount, row.is_cash),
        usd_value: format_usd(row.usd_value),
    }
}

fn format_banner(report: &PortfolioReport) -> String {
    let rule = "═".repeat(64);
    let mut output = String::new();

    output.push_str(&format!("{}\n", rule.cyan()));
    output.push_str(&format!("{}\n", "CRYPTO PORTFOLIO DASHBOARD".cyan().bold()));

    let mut split = format!("(Exchange: {}", format_usd(report.exchange_value));
    if report.cold_value > Decimal::ZERO {
        split.push_str(&format!(" + Cold: {}", format_usd(report.cold_value)));
    }
    split.push(')');
    output.push_str(&format!(
        "{:<16} {}  {}\n",
        "Total Value:",
        format_usd(report.total_value).green().bold(),
        split.dimmed()
    ));
    output.push_str(&format!(
        "{:<16} {}\n",
        "Total Invested:",
        format_usd(report.total_invested)
    ));

    let pnl = format!(
        "{} ({})",
        format_usd(report.total_pnl),
        format_signed_pct(report.roi_pct)
    );
    output.push_str(&format!(
        "{:<16} {}\n",
        "P&L:",
        colored_pnl(report.total_pnl, pnl).bold()
    ));
    output.push_str(&format!("{}\n", rule.cyan()));
    output
}

fn format_deposits(report: &PortfolioReport) -> String {
    let deposits = &report.deposits;
    let local = deposits.local_currency.to_uppercase();
    let mut rows = Vec::new();

    if deposits.local > Decimal::ZERO {
        rows.push(DepositLine {
            kind: format!("{} Deposited", local),
            amount: format!("{} {}", format_with_separators(deposits.local, 2), local),
            notes: "Bank transfers".to_string(),
        });
    }
    if deposits.usdt > Decimal::ZERO {
        rows.push(DepositLine {
            kind: "USDT Deposited".to_string(),
            amount: format!("{} USDT", format_fixed(deposits.usdt, 8)),
            notes: "Direct USDT transfers".to_string(),
        });
    }
    if deposits.btc > Decimal::ZERO {
        rows.push(DepositLine {
            kind: "BTC Deposited".to_string(),
            amount: format!("{} BTC", format_fixed(deposits.btc, 8)),
            notes: "Direct BTC transfers".to_string(),
        });
    }
    rows.push(DepositLine {
        kind: format!("Current {}/USDT Rate", local),
        amount: format_fixed(deposits.local_per_usdt, 2),
        notes: "Live exchange rate".to_string(),
    });

    let mut output = section_title("Deposits Summary (Historical - What You Put In)");
    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..2), Alignment::right());
    output.push_str(&table.to_string());
    output
}

fn format_holdings(title: &str, rows: &[HoldingRow]) -> String {
    let lines: Vec<HoldingLine> = rows.iter().map(holding_line).collect();
    let mut output = section_title(title);
    output.push_str(&render_table(Table::new(&lines)));
    output
}

fn format_combined(rows: &[HoldingRow]) -> String {
    let lines: Vec<CombinedLine> = rows.iter().map(combined_line).collect();
    let mut output = section_title("Total Portfolio (Exchange + Cold Wallet)");
    let mut table = Table::new(&lines);
    table.with(Style::rounded());
    table.modify(Columns::new(1..5), Alignment::right());
    output.push_str(&table.to_string());
    output
}

fn format_average_buy(rows: &[PnlRow]) -> String {
    let lines: Vec<PnlLine> = rows.iter().map(pnl_line).collect();
    let mut output = section_title("Average Buy Prices & P&L");
    output.push_str(&render_table(Table::new(&lines)));
    output
}

fn format_fees(rows: &[FeeRow], total: Decimal) -> String {
    let mut lines: Vec<FeeLine> = rows.iter().map(fee_line).collect();
    lines.push(FeeLine {
        currency: "TOTAL".bold().to_string(),
        amount: String::new(),
        usd_value: format_usd(total).red().bold().to_string(),
    });

    let mut output = section_title("Fees Paid");
    output.push_str(&render_table(Table::new(&lines)));
    output
}

/// Format the full dashboard: banner followed by the report tables
pub fn format_report(report: &PortfolioReport) -> String {
    let mut sections = vec![
        format_banner(report),
        format_deposits(report),
        format_holdings("Exchange Holdings", &report.exchange),
    ];

    if let Some(cold) = &report.cold {
        sections.push(format_holdings("Cold Wallet Holdings", cold));
    }

    sections.push(format_combined(&report.combined));

    if !report.average_buy.is_empty() {
        sections.push(format_average_buy(&report.average_buy));
    }

    sections.push(format_fees(&report.fees, report.total_fees));

    let mut output = sections.join("\n\n");
    output.push('\n');
    output
}

/// Format a portfolio report for JSON output
pub fn format_report_json(report: &PortfolioReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Format cold wallet holdings (already dust-filtered) as a table
pub fn format_cold_wallet(holdings: &ColdHoldings, local_currency: &str) -> String {
    let rows: Vec<ColdLine> = holdings
        .iter()
        .map(|(symbol, amount)| ColdLine {
            currency: symbol.to_uppercase(),
            amount: format_amount(*amount, Currency::classify(symbol, local_currency).is_cash()),
        })
        .collect();

    let mut output = section_title("Cold Wallet Holdings");
    output.push_str(&render_table(Table::new(&rows)));
    output.push('\n');
    output
}

/// Format empty cold wallet message
pub fn format_empty_cold_wallet() -> String {
    format!("{}\n", "Cold wallet is empty".yellow())
}
