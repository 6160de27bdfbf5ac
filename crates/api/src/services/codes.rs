//! Generated order numbers and coupon codes.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Unambiguous uppercase alphabet (no O/0, I/1).
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

fn random_block(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            char::from(CODE_ALPHABET[idx])
        })
        .collect()
}

/// Human-readable order number, e.g. `ATR-20260825-7KQ2`.
///
/// Uniqueness is enforced by the database; a collision within a day's
/// random block surfaces as a conflict from checkout.
#[must_use]
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    format!("ATR-{}-{}", now.format("%Y%m%d"), random_block(4))
}

/// Coupon code for coin redemptions, e.g. `COIN-8F3KQ2TX`.
#[must_use]
pub fn generate_coupon_code() -> String {
    format!("COIN-{}", random_block(8))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn order_number_embeds_the_date() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        let number = generate_order_number(now);
        assert!(number.starts_with("ATR-20260314-"));
        assert_eq!(number.len(), "ATR-20260314-".len() + 4);
    }

    #[test]
    fn codes_use_the_unambiguous_alphabet() {
        let code = generate_coupon_code();
        let block = code.strip_prefix("COIN-").unwrap();
        assert_eq!(block.len(), 8);
        assert!(block.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn coupon_codes_are_not_constant() {
        let codes: std::collections::HashSet<_> =
            (0..32).map(|_| generate_coupon_code()).collect();
        assert!(codes.len() > 1);
    }
}
