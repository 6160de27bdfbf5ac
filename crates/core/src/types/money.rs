//! Money helpers for AED amounts.
//!
//! All monetary amounts in Attara are [`Decimal`] values in AED (stored as
//! `NUMERIC` in PostgreSQL). The helpers here keep the cart preview and the
//! checkout snapshot on exactly the same arithmetic, in particular the coin
//! accrual formula which both sides must agree on.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Redemption value of a single coin, in AED.
pub const COIN_VALUE_AED: Decimal = Decimal::ONE;

/// Minimum number of coins a redemption must spend.
pub const MIN_COIN_REDEMPTION: i32 = 10;

/// One coin is earned per this many AED of order total.
const COIN_EARN_DIVISOR: Decimal = Decimal::TEN;

/// Round a monetary amount to two decimal places.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

/// Coins earned for a given order total: `floor(total / 10)`.
///
/// Applied to the post-tax, post-shipping grand total. Negative or
/// absurdly large inputs clamp to zero / `i32::MAX` rather than panic.
#[must_use]
pub fn coins_for_total(total: Decimal) -> i32 {
    if total <= Decimal::ZERO {
        return 0;
    }
    (total / COIN_EARN_DIVISOR)
        .floor()
        .to_i32()
        .unwrap_or(i32::MAX)
}

/// Most coins a payable amount can absorb: `floor(payable / COIN_VALUE_AED)`.
///
/// Redeeming more than this would burn coins against an amount that has
/// already reached zero, so checkout caps the spend here.
#[must_use]
pub fn max_coins_redeemable(payable: Decimal) -> i32 {
    if payable <= Decimal::ZERO {
        return 0;
    }
    (payable / COIN_VALUE_AED)
        .floor()
        .to_i32()
        .unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coins_floor() {
        assert_eq!(coins_for_total(Decimal::new(999, 1)), 9); // 99.9 AED
        assert_eq!(coins_for_total(Decimal::from(100)), 10);
        assert_eq!(coins_for_total(Decimal::new(10999, 2)), 10); // 109.99 AED
    }

    #[test]
    fn test_coins_zero_and_negative() {
        assert_eq!(coins_for_total(Decimal::ZERO), 0);
        assert_eq!(coins_for_total(Decimal::from(-50)), 0);
        assert_eq!(coins_for_total(Decimal::from(9)), 0);
    }

    #[test]
    fn test_max_coins_redeemable() {
        assert_eq!(max_coins_redeemable(Decimal::new(3550, 2)), 35); // 35.50 AED
        assert_eq!(max_coins_redeemable(Decimal::from(40)), 40);
        assert_eq!(max_coins_redeemable(Decimal::ZERO), 0);
        assert_eq!(max_coins_redeemable(Decimal::from(-5)), 0);
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(Decimal::new(12346, 3)), Decimal::new(1235, 2));
        assert_eq!(round_money(Decimal::new(12344, 3)), Decimal::new(1234, 2));
        assert_eq!(round_money(Decimal::from(7)), Decimal::from(7));
    }
}
