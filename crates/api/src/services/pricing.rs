//! Cart and checkout pricing.
//!
//! All pricing is computed from live catalog rows at read time; nothing here
//! touches the database. The cart preview (`price_cart`) and the checkout
//! snapshot (`price_checkout`) share the same arithmetic so the preview
//! never disagrees with what checkout writes - including the coin accrual
//! formula, which both take from [`attara_core::coins_for_total`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use attara_core::{
    COIN_VALUE_AED, DiscountKind, coins_for_total, max_coins_redeemable, round_money,
};

use crate::models::cart::{CartLineView, PricedCartItem};
use crate::models::coupon::Coupon;

/// Flat VAT rate applied to the subtotal.
const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2); // 0.05

/// Orders above this subtotal ship free.
const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Flat shipping fee below the threshold, in AED.
const SHIPPING_FEE: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

/// Flat gift wrapping fee, in AED.
const GIFT_WRAP_FEE: Decimal = Decimal::from_parts(15, 0, 0, false, 0);

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Pricing failures surfaced to the caller as bad requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("coupon is not active")]
    CouponInactive,
    #[error("coupon has expired")]
    CouponExpired,
    #[error("coupon usage limit reached")]
    CouponExhausted,
    #[error("order subtotal below coupon minimum of {min}")]
    MinOrderNotMet { min: Decimal },
    #[error("coins to use must not be negative")]
    NegativeCoins,
}

/// Totals for the cart preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    pub coins_earnable: i32,
}

/// Totals for the checkout snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping_fee: Decimal,
    pub gift_wrapping_fee: Decimal,
    pub discount: Decimal,
    pub coins_used: i32,
    pub total: Decimal,
    pub coins_earned: i32,
}

/// Checkout inputs that influence pricing.
#[derive(Debug, Clone, Default)]
pub struct CheckoutOptions {
    pub coupon: Option<Coupon>,
    pub coins_to_use: i32,
    pub gift_wrapping: bool,
}

/// Effective unit price: variant price when set, else product price, with an
/// unexpired flash-sale percentage applied on top.
#[must_use]
pub fn effective_unit_price(item: &PricedCartItem, now: DateTime<Utc>) -> Decimal {
    let base = item.variant_price.unwrap_or(item.product_price);
    match (item.flash_sale_percent, item.flash_sale_ends_at) {
        (Some(percent), Some(ends_at)) if ends_at > now && (1..=90).contains(&percent) => {
            round_money(base * (ONE_HUNDRED - Decimal::from(percent)) / ONE_HUNDRED)
        }
        _ => base,
    }
}

/// Price the cart lines and sum the subtotal.
fn price_lines(items: &[PricedCartItem], now: DateTime<Utc>) -> (Vec<CartLineView>, Decimal) {
    let mut subtotal = Decimal::ZERO;
    let lines = items
        .iter()
        .map(|item| {
            let unit_price = effective_unit_price(item, now);
            let line_total = round_money(unit_price * Decimal::from(item.quantity));
            subtotal += line_total;
            CartLineView {
                id: item.id,
                product_id: item.product_id,
                variant_id: item.variant_id,
                product_name: item.product_name.clone(),
                variant_name: item.variant_name.clone(),
                quantity: item.quantity,
                unit_price,
                line_total,
            }
        })
        .collect();
    (lines, subtotal)
}

fn shipping_for(subtotal: Decimal) -> Decimal {
    if subtotal > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        SHIPPING_FEE
    }
}

/// Compute the cart preview: subtotal, 5% tax, threshold shipping and the
/// coins the order would earn.
#[must_use]
pub fn price_cart(items: &[PricedCartItem], now: DateTime<Utc>) -> (Vec<CartLineView>, CartTotals) {
    let (lines, subtotal) = price_lines(items, now);
    let tax = round_money(subtotal * TAX_RATE);
    let shipping_fee = shipping_for(subtotal);
    let total = round_money(subtotal + tax + shipping_fee);
    let totals = CartTotals {
        subtotal,
        tax,
        shipping_fee,
        total,
        coins_earnable: coins_for_total(total),
    };
    (lines, totals)
}

/// Validate a coupon against the subtotal and return its discount amount.
fn coupon_discount(
    coupon: &Coupon,
    subtotal: Decimal,
    now: DateTime<Utc>,
) -> Result<Decimal, PricingError> {
    if !coupon.is_active {
        return Err(PricingError::CouponInactive);
    }
    if coupon.expires_at.is_some_and(|at| at <= now) {
        return Err(PricingError::CouponExpired);
    }
    if coupon.used_count >= coupon.usage_limit {
        return Err(PricingError::CouponExhausted);
    }
    if subtotal < coupon.min_order_amount {
        return Err(PricingError::MinOrderNotMet {
            min: coupon.min_order_amount,
        });
    }
    let discount = match coupon.kind {
        DiscountKind::Percent => round_money(subtotal * coupon.value / ONE_HUNDRED),
        DiscountKind::Fixed => coupon.value,
    };
    Ok(discount)
}

/// Compute the checkout snapshot totals.
///
/// `total = subtotal + tax + shipping + gift wrap - discount - coins_used`,
/// floored at zero. The coin spend is capped at what the post-discount
/// payable amount can absorb, so `coins_used` in the returned totals may be
/// lower than requested and no coin is ever debited against a zero total.
/// `coins_earned` uses the same formula as the cart preview, applied to the
/// final total.
///
/// # Errors
///
/// Returns a [`PricingError`] for an empty cart, an unusable coupon, or a
/// negative coin amount.
pub fn price_checkout(
    items: &[PricedCartItem],
    options: &CheckoutOptions,
    now: DateTime<Utc>,
) -> Result<(Vec<CartLineView>, CheckoutTotals), PricingError> {
    if items.is_empty() {
        return Err(PricingError::EmptyCart);
    }
    if options.coins_to_use < 0 {
        return Err(PricingError::NegativeCoins);
    }

    let (lines, subtotal) = price_lines(items, now);
    let tax = round_money(subtotal * TAX_RATE);
    let shipping_fee = shipping_for(subtotal);
    let gift_wrapping_fee = if options.gift_wrapping {
        GIFT_WRAP_FEE
    } else {
        Decimal::ZERO
    };

    let discount = match &options.coupon {
        Some(coupon) => coupon_discount(coupon, subtotal, now)?,
        None => Decimal::ZERO,
    };

    let gross = subtotal + tax + shipping_fee + gift_wrapping_fee;
    let payable = round_money((gross - discount).max(Decimal::ZERO));

    let coins_used = options.coins_to_use.min(max_coins_redeemable(payable));
    let coin_credit = Decimal::from(coins_used) * COIN_VALUE_AED;

    let total = round_money((payable - coin_credit).max(Decimal::ZERO));

    let totals = CheckoutTotals {
        subtotal,
        tax,
        shipping_fee,
        gift_wrapping_fee,
        discount,
        coins_used,
        total,
        coins_earned: coins_for_total(total),
    };
    Ok((lines, totals))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use attara_core::{CartItemId, CouponId, ProductId, VariantId, VendorId};
    use chrono::Duration;

    fn item(product_price: i64, variant_price: Option<i64>, quantity: i32) -> PricedCartItem {
        PricedCartItem {
            id: CartItemId::new(1),
            product_id: ProductId::new(1),
            variant_id: variant_price.map(|_| VariantId::new(1)),
            vendor_id: VendorId::new(1),
            product_name: "Oud Royale".to_owned(),
            variant_name: variant_price.map(|_| "100ml".to_owned()),
            quantity,
            product_price: Decimal::from(product_price),
            variant_price: variant_price.map(Decimal::from),
            flash_sale_percent: None,
            flash_sale_ends_at: None,
        }
    }

    fn coupon(kind: DiscountKind, value: i64) -> Coupon {
        Coupon {
            id: CouponId::new(1),
            code: "SAVE".to_owned(),
            vendor_id: None,
            user_id: None,
            kind,
            value: Decimal::from(value),
            min_order_amount: Decimal::ZERO,
            usage_limit: 10,
            used_count: 0,
            expires_at: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_variant_price_overrides_product_price() {
        let now = Utc::now();
        let items = vec![item(100, Some(80), 2)];
        let (lines, totals) = price_cart(&items, now);
        assert_eq!(lines[0].unit_price, Decimal::from(80));
        assert_eq!(totals.subtotal, Decimal::from(160));
    }

    #[test]
    fn test_subtotal_is_sum_of_lines() {
        let now = Utc::now();
        let items = vec![item(100, None, 2), item(50, None, 1)];
        let (lines, totals) = price_cart(&items, now);
        let sum: Decimal = lines.iter().map(|l| l.line_total).sum();
        assert_eq!(totals.subtotal, sum);
        assert_eq!(totals.subtotal, Decimal::from(250));
    }

    #[test]
    fn test_tax_is_five_percent() {
        let now = Utc::now();
        let (_, totals) = price_cart(&[item(100, None, 1)], now);
        assert_eq!(totals.tax, Decimal::from(5));
    }

    #[test]
    fn test_shipping_threshold() {
        let now = Utc::now();
        // 200 exactly is NOT free (threshold is strict).
        let (_, at_threshold) = price_cart(&[item(200, None, 1)], now);
        assert_eq!(at_threshold.shipping_fee, Decimal::from(25));

        let (_, above) = price_cart(&[item(201, None, 1)], now);
        assert_eq!(above.shipping_fee, Decimal::ZERO);
    }

    #[test]
    fn test_coins_earnable_from_grand_total() {
        let now = Utc::now();
        // subtotal 100, tax 5, shipping 25 => total 130 => 13 coins
        let (_, totals) = price_cart(&[item(100, None, 1)], now);
        assert_eq!(totals.total, Decimal::from(130));
        assert_eq!(totals.coins_earnable, 13);
    }

    #[test]
    fn test_flash_sale_applies_while_active() {
        let now = Utc::now();
        let mut it = item(100, None, 1);
        it.flash_sale_percent = Some(20);
        it.flash_sale_ends_at = Some(now + Duration::hours(1));
        assert_eq!(effective_unit_price(&it, now), Decimal::from(80));

        it.flash_sale_ends_at = Some(now - Duration::hours(1));
        assert_eq!(effective_unit_price(&it, now), Decimal::from(100));
    }

    #[test]
    fn test_flash_sale_discounts_variant_price() {
        let now = Utc::now();
        let mut it = item(100, Some(50), 1);
        it.flash_sale_percent = Some(10);
        it.flash_sale_ends_at = Some(now + Duration::hours(1));
        assert_eq!(effective_unit_price(&it, now), Decimal::from(45));
    }

    #[test]
    fn test_checkout_empty_cart_rejected() {
        let result = price_checkout(&[], &CheckoutOptions::default(), Utc::now());
        assert_eq!(result.unwrap_err(), PricingError::EmptyCart);
    }

    #[test]
    fn test_checkout_percent_coupon() {
        let now = Utc::now();
        let options = CheckoutOptions {
            coupon: Some(coupon(DiscountKind::Percent, 10)),
            ..CheckoutOptions::default()
        };
        let (_, totals) = price_checkout(&[item(100, None, 1)], &options, now).unwrap();
        assert_eq!(totals.discount, Decimal::from(10));
        // 100 + 5 + 25 - 10
        assert_eq!(totals.total, Decimal::from(120));
    }

    #[test]
    fn test_checkout_fixed_coupon_and_coins() {
        let now = Utc::now();
        let options = CheckoutOptions {
            coupon: Some(coupon(DiscountKind::Fixed, 20)),
            coins_to_use: 30,
            gift_wrapping: true,
        };
        let (_, totals) = price_checkout(&[item(100, None, 1)], &options, now).unwrap();
        // 100 + 5 + 25 + 15 - 20 - 30
        assert_eq!(totals.total, Decimal::from(95));
        assert_eq!(totals.coins_used, 30);
        assert_eq!(totals.gift_wrapping_fee, Decimal::from(15));
        assert_eq!(totals.coins_earned, 9);
    }

    #[test]
    fn test_checkout_coin_spend_capped_at_payable() {
        let now = Utc::now();
        let options = CheckoutOptions {
            coins_to_use: 100,
            ..CheckoutOptions::default()
        };
        // 10 + 0.50 + 25 = 35.50 payable; only 35 whole coins fit.
        let (_, totals) = price_checkout(&[item(10, None, 1)], &options, now).unwrap();
        assert_eq!(totals.coins_used, 35);
        assert_eq!(totals.total, Decimal::new(50, 2));
    }

    #[test]
    fn test_checkout_coupon_zeroes_payable_before_coins() {
        let now = Utc::now();
        let options = CheckoutOptions {
            coupon: Some(coupon(DiscountKind::Fixed, 500)),
            coins_to_use: 50,
            ..CheckoutOptions::default()
        };
        let (_, totals) = price_checkout(&[item(10, None, 1)], &options, now).unwrap();
        assert_eq!(totals.coins_used, 0);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_checkout_total_floors_at_zero() {
        let now = Utc::now();
        let options = CheckoutOptions {
            coupon: Some(coupon(DiscountKind::Fixed, 500)),
            ..CheckoutOptions::default()
        };
        let (_, totals) = price_checkout(&[item(10, None, 1)], &options, now).unwrap();
        assert_eq!(totals.total, Decimal::ZERO);
        assert_eq!(totals.coins_earned, 0);
    }

    #[test]
    fn test_checkout_coupon_guards() {
        let now = Utc::now();
        let items = vec![item(100, None, 1)];

        let mut inactive = coupon(DiscountKind::Fixed, 5);
        inactive.is_active = false;
        let options = CheckoutOptions {
            coupon: Some(inactive),
            ..CheckoutOptions::default()
        };
        assert_eq!(
            price_checkout(&items, &options, now).unwrap_err(),
            PricingError::CouponInactive
        );

        let mut expired = coupon(DiscountKind::Fixed, 5);
        expired.expires_at = Some(now - Duration::days(1));
        let options = CheckoutOptions {
            coupon: Some(expired),
            ..CheckoutOptions::default()
        };
        assert_eq!(
            price_checkout(&items, &options, now).unwrap_err(),
            PricingError::CouponExpired
        );

        let mut exhausted = coupon(DiscountKind::Fixed, 5);
        exhausted.used_count = exhausted.usage_limit;
        let options = CheckoutOptions {
            coupon: Some(exhausted),
            ..CheckoutOptions::default()
        };
        assert_eq!(
            price_checkout(&items, &options, now).unwrap_err(),
            PricingError::CouponExhausted
        );

        let mut min_order = coupon(DiscountKind::Fixed, 5);
        min_order.min_order_amount = Decimal::from(500);
        let options = CheckoutOptions {
            coupon: Some(min_order),
            ..CheckoutOptions::default()
        };
        assert!(matches!(
            price_checkout(&items, &options, now).unwrap_err(),
            PricingError::MinOrderNotMet { .. }
        ));
    }

    #[test]
    fn test_checkout_negative_coins_rejected() {
        let options = CheckoutOptions {
            coins_to_use: -1,
            ..CheckoutOptions::default()
        };
        assert_eq!(
            price_checkout(&[item(10, None, 1)], &options, Utc::now()).unwrap_err(),
            PricingError::NegativeCoins
        );
    }
}
