use std::fmt::Write;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const THOUSAND: u128 = 1000;

/// Format a decimal as a dollar amount with thousands separators: $1,234.56
pub fn money(val: Decimal) -> String {
    let rounded = val.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let abs = rounded.abs();
    let whole = abs.trunc();
    let cents = ((abs - whole) * Decimal::ONE_HUNDRED).to_u32().unwrap_or(0);

    // Decimal's range fits in u128
    let mut rest = whole.to_u128().unwrap_or(0);
    let mut groups = Vec::new();
    while rest >= THOUSAND {
        groups.push(rest % THOUSAND);
        rest /= THOUSAND;
    }
    let mut out = format!("{sign}${rest}");
    for group in groups.iter().rev() {
        let _ = write!(out, ",{group:03}");
    }
    let _ = write!(out, ".{cents:02}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(Decimal::new(123456, 2)), "$1,234.56");
        assert_eq!(money(Decimal::new(-500, 0)), "-$500.00");
        assert_eq!(money(Decimal::ZERO), "$0.00");
        assert_eq!(money(Decimal::new(100000099, 2)), "$1,000,000.99");
        assert_eq!(money(Decimal::new(421, 1)), "$42.10");
        assert_eq!(money(Decimal::new(-1, 3)), "$0.00");
        assert_eq!(money(Decimal::new(1000, 0)), "$1,000.00");
        assert_eq!(money(Decimal::new(999_999, 0)), "$999,999.00");
        assert_eq!(money(Decimal::new(1_000_001_005, 3)), "$1,000,001.01");
        assert_eq!(money(Decimal::new(-12_345_678, 2)), "-$123,456.78");
        assert_eq!(money(Decimal::MAX), "$79,228,162,514,264,337,593,543,950,335.00");
    }
}
