//! Utility functions for formatting numbers
//!
//! This module provides centralized formatting utilities for consistent
//! display of amounts, prices and USD values throughout the report.

use rust_decimal::{Decimal, RoundingStrategy};

/// Core formatting function: fixed decimals with `,` thousands separators.
///
/// # Examples
/// ```
/// use balance::utils::format_with_separators;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_with_separators(dec!(1234567.891), 2), "1,234,567.89");
/// assert_eq!(format_with_separators(dec!(-1000), 0), "-1,000");
/// ```
pub fn format_with_separators(value: Decimal, decimals: u32) -> String {
    let is_negative = value < Decimal::ZERO;
    let rounded = value
        .abs()
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);

    let formatted = format!("{:.*}", decimals as usize, rounded);
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((int, dec)) => (int, Some(dec)),
        None => (formatted.as_str(), None),
    };

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative && !rounded.is_zero() { "-" } else { "" };
    match decimal_part {
        Some(dec) => format!("{}{}.{}", sign, with_separators, dec),
        None => format!("{}{}", sign, with_separators),
    }
}

/// USD value with 2 decimals: "$1,234.56" (negative: "$-12.00")
pub fn format_usd(value: Decimal) -> String {
    format!("${}", format_with_separators(value, 2))
}

/// Signed USD amount for P&L cells: "+$1,234.56" or "$-12.00"
pub fn format_signed_usd(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format!("+{}", format_usd(value))
    } else {
        format_usd(value)
    }
}

/// Signed percentage with 2 decimals: "+12.50%"
pub fn format_signed_pct(value: Decimal) -> String {
    let sign = if value >= Decimal::ZERO { "+" } else { "" };
    format!("{}{}%", sign, format_fixed(value, 2))
}

/// Fixed number of decimals without separators
pub fn format_fixed(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", decimals as usize, rounded)
}

/// Balance cell: cash currencies get 2 decimals with separators,
/// crypto gets 8 decimals
pub fn format_amount(value: Decimal, is_cash: bool) -> String {
    if is_cash {
        format_with_separators(value, 2)
    } else {
        format_fixed(value, 8)
    }
}

/// Price cell, precision depends on magnitude; "-" for no price
pub fn format_price(price: Decimal) -> String {
    if price >= Decimal::ONE_THOUSAND {
        format!("${}", format_with_separators(price, 0))
    } else if price >= Decimal::ONE {
        format!("${}", format_with_separators(price, 2))
    } else if price > Decimal::ZERO {
        format!("${}", format_fixed(price, 4))
    } else {
        "-".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_with_separators() {
        assert_eq!(format_with_separators(dec!(0), 2), "0.00");
        assert_eq!(format_with_separators(dec!(999.99), 2), "999.99");
        assert_eq!(format_with_separators(dec!(1000), 2), "1,000.00");
        assert_eq!(format_with_separators(dec!(12345678.9), 2), "12,345,678.90");
        assert_eq!(format_with_separators(dec!(-1234.5), 2), "-1,234.50");
    }

    #[test]
    fn test_rounding() {
        assert_eq!(format_with_separators(dec!(1.005), 2), "1.01");
        assert_eq!(format_with_separators(dec!(64250.5), 0), "64,251");
        assert_eq!(format_with_separators(dec!(-0.001), 2), "0.00");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(dec!(1234.5)), "$1,234.50");
        assert_eq!(format_usd(dec!(-12)), "$-12.00");
        assert_eq!(format_signed_usd(dec!(500)), "+$500.00");
        assert_eq!(format_signed_usd(dec!(-3.456)), "$-3.46");
        assert_eq!(format_signed_usd(Decimal::ZERO), "+$0.00");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(15234.5), true), "15,234.50");
        assert_eq!(format_amount(dec!(0.05), false), "0.05000000");
        assert_eq!(format_amount(dec!(1234.123456789), false), "1234.12345679");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(dec!(64250.49)), "$64,250");
        assert_eq!(format_price(dec!(1000)), "$1,000");
        assert_eq!(format_price(dec!(150.256)), "$150.26");
        assert_eq!(format_price(dec!(1)), "$1.00");
        assert_eq!(format_price(dec!(0.0575)), "$0.0575");
        assert_eq!(format_price(dec!(0.00001234)), "$0.0000");
        assert_eq!(format_price(Decimal::ZERO), "-");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_signed_pct(dec!(12.5)), "+12.50%");
        assert_eq!(format_signed_pct(dec!(-40)), "-40.00%");
    }
}
