//! Exact fixed-point products.
//!
//! `Decimal::checked_mul` only fails when a product cannot be represented
//! even at scale 0. Before that it quietly drops fractional digits to fit
//! the 96-bit mantissa. Collateral and notional amounts must be exact
//! or the ledger's locks stop reconciling with the orders, so every such
//! product goes through [`exact_mul`].
//!
//! Fees only need to be exact up to their truncation point, which
//! [`bps_of_truncated`] computes on the integer mantissa.

use rust_decimal::Decimal;

use crate::{Result, SharebookError, constants};

/// `a * b`, or `ArithmeticOverflow` if the product cannot be held exactly.
pub fn exact_mul(a: Decimal, b: Decimal, context: &str) -> Result<Decimal> {
    let (a, b) = (a.normalize(), b.normalize());
    let product = a
        .checked_mul(b)
        .ok_or_else(|| SharebookError::overflow(context))?;
    if !product.is_zero() && product.scale() < a.scale() + b.scale() {
        return Err(SharebookError::overflow(context));
    }
    Ok(product)
}

/// `amount * bps / 10_000`, truncated toward zero at `decimals` places.
///
/// Works on the 96-bit mantissa widened to `i128`, so no digit is rounded
/// away before the truncation.
pub fn bps_of_truncated(
    amount: Decimal,
    bps: u32,
    decimals: u32,
    context: &str,
) -> Result<Decimal> {
    let overflow = || SharebookError::overflow(context);
    let scaled = amount
        .mantissa()
        .checked_mul(i128::from(bps))
        .ok_or_else(overflow)?;
    let scale = amount.scale() + constants::BPS_SCALE;

    let (mut mantissa, mut scale) = if scale > decimals {
        let divisor = 10_i128
            .checked_pow(scale - decimals)
            .ok_or_else(overflow)?;
        (scaled / divisor, decimals)
    } else {
        (scaled, scale)
    };
    while scale > 0 && mantissa % 10 == 0 && mantissa != 0 {
        mantissa /= 10;
        scale -= 1;
    }
    Decimal::try_from_i128_with_scale(mantissa, scale).map_err(|_| overflow())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_products_are_exact() {
        assert_eq!(
            exact_mul(Decimal::new(25, 1), Decimal::new(6, 0), "q").unwrap(),
            Decimal::new(15, 0)
        );
        assert_eq!(
            exact_mul(Decimal::new(1, 8), Decimal::new(1, 6), "q").unwrap(),
            Decimal::new(1, 14)
        );
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() {
        // 10.00 * 1.000 needs no fractional digits at all.
        assert_eq!(
            exact_mul(Decimal::new(1000, 2), Decimal::new(1000, 3), "q").unwrap(),
            Decimal::new(10, 0)
        );
    }

    #[test]
    fn zero_operand() {
        assert!(exact_mul(Decimal::ZERO, Decimal::new(123, 5), "q").unwrap().is_zero());
    }

    #[test]
    fn rounded_product_rejected() {
        // 98765432.12345679 * 9999999.999999 needs 29 significant digits.
        let qty = Decimal::new(9_876_543_212_345_679, 8);
        let price = Decimal::new(9_999_999_999_999, 6);
        assert!(qty.checked_mul(price).is_some(), "plain mul rounds silently");
        assert!(matches!(
            exact_mul(qty, price, "buy order collateral"),
            Err(SharebookError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn bps_truncates_at_requested_places() {
        // 12 * 30 bps = 0.036
        assert_eq!(
            bps_of_truncated(Decimal::new(12, 0), 30, 2, "fee").unwrap(),
            Decimal::new(3, 2)
        );
        assert_eq!(
            bps_of_truncated(Decimal::new(12, 0), 30, 6, "fee").unwrap(),
            Decimal::new(36, 3)
        );
        assert_eq!(
            bps_of_truncated(Decimal::new(12, 0), 0, 6, "fee").unwrap(),
            Decimal::ZERO
        );
        assert_eq!(
            bps_of_truncated(Decimal::new(7, 0), 10_000, 6, "fee").unwrap(),
            Decimal::new(7, 0)
        );
    }

    #[test]
    fn bps_of_full_width_amount_keeps_leading_digits() {
        // 28 significant digits times 30 bps would round as a Decimal product.
        let quote = Decimal::new(9_876_543_212_345_679, 8)
            .checked_mul(Decimal::new(999_999_999_999, 5))
            .unwrap();
        let fee = bps_of_truncated(quote, 30, 6, "fee").unwrap();
        assert!(fee.scale() <= 6);
        assert!(fee <= quote);
        let expected = (quote * Decimal::new(3, 3)).round_dp_with_strategy(
            6,
            rust_decimal::RoundingStrategy::ToZero,
        );
        assert!((fee - expected).abs() <= Decimal::new(1, 6));
    }

    #[test]
    fn unrepresentable_product_rejected() {
        assert!(matches!(
            exact_mul(Decimal::MAX, Decimal::new(2, 0), "q"),
            Err(SharebookError::ArithmeticOverflow { .. })
        ));
    }
}
