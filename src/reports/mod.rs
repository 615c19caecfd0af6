// Reports module - ledger replay, cost basis and portfolio valuation

pub mod balance;
pub mod cost_basis;
pub mod portfolio;

use rust_decimal::Decimal;

pub use balance::Ledger;
pub use cost_basis::{average_buy_price, AverageCostMatcher, CostBasis};
pub use portfolio::{calculate_portfolio, PortfolioReport};

/// Balances at or below 0.00001 are treated as empty
pub const DUST_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 5);
