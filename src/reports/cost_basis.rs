use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::importers::{Trade, TradeSide};
use crate::pricing::Quotes;

/// Weighted-average cost of the units still held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CostBasis {
    pub average_price: Decimal,
    pub holdings: Decimal,
}

impl CostBasis {
    pub const NONE: CostBasis = CostBasis {
        average_price: Decimal::ZERO,
        holdings: Decimal::ZERO,
    };
}

/// Running average-cost position for a single asset
#[derive(Debug, Clone, Default)]
pub struct AverageCostMatcher {
    total_quantity: Decimal,
    total_cost: Decimal,
}

impl AverageCostMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_purchase(&mut self, quantity: Decimal, cost: Decimal) {
        self.total_quantity += quantity;
        self.total_cost += cost;
    }

    /// Remove `quantity` at the current average cost and return the cost
    /// released. Ignored (None) while nothing is held; selling more than
    /// is held drives the quantity negative.
    pub fn match_sale(&mut self, quantity: Decimal) -> Option<Decimal> {
        if self.total_quantity <= Decimal::ZERO {
            return None;
        }

        let cost_basis = self.average_cost() * quantity;
        self.total_quantity -= quantity;
        self.total_cost -= cost_basis;
        Some(cost_basis)
    }

    pub fn remaining_quantity(&self) -> Decimal {
        self.total_quantity
    }

    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }

    pub fn average_cost(&self) -> Decimal {
        if self.total_quantity > Decimal::ZERO {
            self.total_cost / self.total_quantity
        } else {
            Decimal::ZERO
        }
    }

    pub fn summary(&self) -> CostBasis {
        if self.total_quantity > Decimal::ZERO && self.total_cost > Decimal::ZERO {
            CostBasis {
                average_price: self.average_cost(),
                holdings: self.total_quantity,
            }
        } else {
            CostBasis::NONE
        }
    }
}

/// Replay the trades of `asset` in file order and return its average buy
/// price in USDT. Buys paid in a non-cash currency are skipped. All cash
/// values convert at the current local rate, not the rate at trade time.
pub fn average_buy_price(trades: &[Trade], asset: &str, quotes: &Quotes) -> CostBasis {
    let mut matcher = AverageCostMatcher::new();

    for trade in trades.iter().filter(|t| t.major == asset) {
        match trade.side {
            TradeSide::Buy => match quotes.to_usdt(&trade.minor, trade.value) {
                Some(cost) => matcher.add_purchase(trade.total, cost),
                None => debug!(
                    "Skipping {} buy paid in {} for cost basis",
                    asset, trade.minor
                ),
            },
            TradeSide::Sell => {
                if matcher.match_sale(trade.amount).is_none() {
                    debug!("Ignoring {} sell with no holdings", asset);
                }
            }
        }
    }

    matcher.summary()
}
