//! Subtotal, tax and total calculations.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Sales tax rate applied to the subtotal (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Decimal places shown for money.
pub const MONEY_DP: u32 = 2;

/// Round an amount for display.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Derived cart figures.
///
/// `subtotal`, `tax_exact` and `total_exact` keep full precision; `tax` and
/// `total` are rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct CartTotals {
    /// Exact sum of line prices.
    pub subtotal: Decimal,
    /// Tax rounded to cents.
    pub tax: Decimal,
    /// Total rounded to cents.
    pub total: Decimal,
    /// Unrounded tax.
    pub tax_exact: Decimal,
    /// Unrounded total.
    pub total_exact: Decimal,
}

impl CartTotals {
    /// Derive totals from a subtotal.
    ///
    /// Arithmetic saturates at `Decimal::MAX` instead of panicking.
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let tax_exact = subtotal.saturating_mul(TAX_RATE);
        let total_exact = subtotal.saturating_add(tax_exact);

        Self {
            subtotal,
            tax: round_money(tax_exact),
            total: round_money(total_exact),
            tax_exact,
            total_exact,
        }
    }

    /// Derive totals from a sequence of prices.
    pub fn from_prices<I>(prices: I) -> Self
    where
        I: IntoIterator<Item = Decimal>,
    {
        let subtotal = prices
            .into_iter()
            .fold(Decimal::ZERO, |acc, price| acc.saturating_add(price));
        Self::from_subtotal(subtotal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn tax_rate_is_eight_percent() {
        assert_eq!(TAX_RATE, dec!(0.08));
    }

    #[test]
    fn scenario_fifteen_dollars() {
        let totals = CartTotals::from_prices([dec!(10.00), dec!(5.00)]);
        assert_eq!(totals.subtotal, dec!(15.00));
        assert_eq!(totals.tax, dec!(1.20));
        assert_eq!(totals.total, dec!(16.20));
    }

    #[test]
    fn empty_is_zero() {
        let totals = CartTotals::from_prices(std::iter::empty());
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn rounding_happens_only_at_the_edge() {
        // 299.99 * 0.08 = 23.9992
        let totals = CartTotals::from_subtotal(dec!(299.99));
        assert_eq!(totals.tax_exact, dec!(23.9992));
        assert_eq!(totals.tax, dec!(24.00));
        assert_eq!(totals.total_exact, dec!(323.9892));
        assert_eq!(totals.total, dec!(323.99));
    }

    #[test]
    fn huge_sums_saturate_instead_of_overflowing() {
        let totals = CartTotals::from_prices([Decimal::MAX, Decimal::MAX]);
        assert_eq!(totals.subtotal, Decimal::MAX);
        assert_eq!(totals.total_exact, Decimal::MAX);
        assert_eq!(totals.total, Decimal::MAX);
        assert!(totals.tax > Decimal::ZERO);
    }

    #[test]
    fn midpoint_rounds_away_from_zero() {
        assert_eq!(round_money(dec!(0.125)), dec!(0.13));
        assert_eq!(round_money(dec!(0.135)), dec!(0.14));
    }

    #[test]
    fn rounded_parts_stay_within_a_cent_of_total() {
        for cents in [1i64, 7, 13, 999, 12345, 29999, 149999, 333333] {
            let totals = CartTotals::from_subtotal(Decimal::new(cents, 2));
            let drift = (totals.subtotal + totals.tax - totals.total).abs();
            assert!(drift <= dec!(0.01), "drift {} for {}", drift, cents);
            assert_eq!(totals.total_exact, totals.subtotal + totals.tax_exact);
        }
    }
}
