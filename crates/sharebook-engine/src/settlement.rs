//! Fill settlement.
//!
//! For each matched (buy, sell, quantity) pair at the maker's price:
//! 1. `quote_amount = quantity * price`, rejecting on overflow
//! 2. `fee = quote_amount * fee_rate_bps / 10_000`, truncated to quote precision
//! 3. Release the seller's locked base and the buyer's locked quote for
//!    `quantity` (at the buyer's own limit)
//! 4. Transfer base seller → buyer, `quote_amount - fee` buyer → seller,
//!    `fee` buyer → fee recipient
//! 5. Advance both orders' `filled`, closing any that are complete
//! 6. Fold the fill into the staged market statistics
//!
//! Everything lands in the [`UnitOfWork`]; nothing is applied here.
//! When the buyer is the taker and pays less than its limit, the
//! difference stays in its available balance (price improvement).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sharebook_ledger::LedgerOp;
use sharebook_types::{
    Fill, MarketConfig, Order, OrderSide, Result, SharebookError, bps_of_truncated, exact_mul,
};

use crate::unit_of_work::UnitOfWork;

/// Exact `quantity * price`, or `ArithmeticOverflow`.
///
/// Kept at full `base_decimals + quote_decimals` precision so the buyer's
/// per-fill releases sum to exactly what its order locked.
pub fn quote_amount(quantity: Decimal, price: Decimal) -> Result<Decimal> {
    exact_mul(quantity, price, "quote amount")
}

/// Protocol fee on `quote_amount`, truncated toward zero at quote precision.
pub fn compute_fee(quote_amount: Decimal, config: &MarketConfig) -> Result<Decimal> {
    bps_of_truncated(quote_amount, config.fee_rate_bps, config.quote_decimals, "fee")
}

fn advance(order: &mut Order, quantity: Decimal) -> Result<()> {
    let filled = order
        .filled
        .checked_add(quantity)
        .ok_or_else(|| SharebookError::overflow("filled quantity"))?;
    debug_assert!(filled <= order.base_amount, "fill exceeds order size");
    order.filled = filled;
    if order.is_filled() {
        order.active = false;
    }
    Ok(())
}

/// Stage the settlement of one fill between the incoming `taker` and the
/// resting `maker`. Both records are advanced in place.
pub(crate) fn settle(
    uow: &mut UnitOfWork,
    config: &MarketConfig,
    taker: &mut Order,
    maker: &mut Order,
    quantity: Decimal,
    executed_at: DateTime<Utc>,
) -> Result<Fill> {
    let price = maker.price;
    let quote = quote_amount(quantity, price)?;
    let fee = compute_fee(quote, config)?;
    let proceeds = quote
        .checked_sub(fee)
        .ok_or_else(|| SharebookError::overflow("seller proceeds"))?;

    let (buy, sell) = match taker.side {
        OrderSide::Buy => (&mut *taker, &mut *maker),
        OrderSide::Sell => (&mut *maker, &mut *taker),
    };
    let buyer_collateral = buy.collateral_for(quantity)?;

    let market = &config.market;
    uow.push_op(LedgerOp::release(sell.trader, &market.base, quantity));
    uow.push_op(LedgerOp::release(buy.trader, &market.quote, buyer_collateral));
    uow.push_op(LedgerOp::transfer(sell.trader, buy.trader, &market.base, quantity));
    uow.push_op(LedgerOp::transfer(buy.trader, sell.trader, &market.quote, proceeds));
    uow.push_op(LedgerOp::transfer(buy.trader, config.fee_recipient, &market.quote, fee));

    advance(buy, quantity)?;
    advance(sell, quantity)?;

    let fill = Fill {
        trade_seq: uow.next_trade_seq(),
        taker_order_id: taker.id,
        taker: taker.trader,
        maker_order_id: maker.id,
        maker: maker.trader,
        taker_side: taker.side,
        price,
        quantity,
        quote_amount: quote,
        fee,
        executed_at,
    };
    uow.record_fill(fill.clone())?;

    tracing::debug!(
        trade = fill.trade_seq,
        taker_order = %fill.taker_order_id,
        maker_order = %fill.maker_order_id,
        side = %fill.taker_side,
        price = %fill.price,
        qty = %fill.quantity,
        fee = %fill.fee,
        "Fill settled"
    );
    Ok(fill)
}

#[cfg(test)]
mod tests {
    use sharebook_types::{MarketStats, OrderId, TraderId};

    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn order(id: u64, trader: u8, side: OrderSide, amount: i64, price: Decimal) -> Order {
        Order {
            id: OrderId(id),
            trader: TraderId::from_bytes([trader; 16]),
            side,
            base_amount: dec(amount),
            filled: Decimal::ZERO,
            price,
            active: true,
            sequence: id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fee_is_bps_of_quote_truncated() {
        let cfg = MarketConfig {
            fee_rate_bps: 30,
            quote_decimals: 2,
            ..MarketConfig::default()
        };
        // 12 * 0.003 = 0.036 -> 0.03
        assert_eq!(compute_fee(dec(12), &cfg).unwrap(), Decimal::new(3, 2));
        assert_eq!(compute_fee(Decimal::ZERO, &cfg).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn zero_fee_rate_takes_nothing() {
        let cfg = MarketConfig {
            fee_rate_bps: 0,
            ..MarketConfig::default()
        };
        assert_eq!(compute_fee(dec(1_000), &cfg).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn quote_overflow_detected() {
        assert!(matches!(
            quote_amount(Decimal::MAX, dec(2)),
            Err(SharebookError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn quote_that_would_round_is_overflow() {
        let qty = Decimal::new(9_876_543_212_345_679, 8);
        let price = Decimal::new(9_999_999_999_999, 6);
        assert!(matches!(
            quote_amount(qty, price),
            Err(SharebookError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn fee_below_quote_precision_truncates_to_zero() {
        let cfg = MarketConfig::default();
        // 0.00000000000001 * 0.003 rounds down to nothing at 6 places.
        let quote = quote_amount(Decimal::new(1, 8), Decimal::new(1, 6)).unwrap();
        assert_eq!(compute_fee(quote, &cfg).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn settle_buy_taker_at_maker_price() {
        let cfg = MarketConfig::default();
        let mut uow = UnitOfWork::new(&MarketStats::default());
        let mut taker = order(2, 2, OrderSide::Buy, 6, Decimal::new(25, 1));
        let mut maker = order(1, 1, OrderSide::Sell, 10, dec(2));

        let fill = settle(&mut uow, &cfg, &mut taker, &mut maker, dec(6), Utc::now()).unwrap();

        assert_eq!(fill.price, dec(2));
        assert_eq!(fill.quote_amount, dec(12));
        assert_eq!(fill.trade_seq, 1);
        assert!(!taker.active, "fully filled taker closes");
        assert!(maker.active);
        assert_eq!(maker.remaining(), dec(4));

        // Buyer releases collateral at its own 2.5 limit, not the 2.0 trade price.
        assert!(uow.ledger_ops().contains(&LedgerOp::release(
            taker.trader,
            &cfg.market.quote,
            dec(15)
        )));
        assert!(uow.ledger_ops().contains(&LedgerOp::transfer(
            maker.trader,
            taker.trader,
            &cfg.market.base,
            dec(6)
        )));
    }

    #[test]
    fn settle_sell_taker_pays_fee_from_buyer_quote() {
        let cfg = MarketConfig {
            fee_rate_bps: 100,
            ..MarketConfig::default()
        };
        let mut uow = UnitOfWork::new(&MarketStats::default());
        let mut taker = order(2, 2, OrderSide::Sell, 5, dec(3));
        let mut maker = order(1, 1, OrderSide::Buy, 5, dec(4));

        let fill = settle(&mut uow, &cfg, &mut taker, &mut maker, dec(5), Utc::now()).unwrap();

        assert_eq!(fill.price, dec(4));
        assert_eq!(fill.quote_amount, dec(20));
        assert_eq!(fill.fee, Decimal::new(2, 1));
        assert_eq!(fill.counterparties(), (maker.trader, taker.trader));
        assert!(uow.ledger_ops().contains(&LedgerOp::transfer(
            maker.trader,
            cfg.fee_recipient,
            &cfg.market.quote,
            Decimal::new(2, 1)
        )));
        assert!(!taker.active && !maker.active);
    }
}
