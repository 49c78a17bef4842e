//! Continuous price-time matching.
//!
//! `plan_submission` turns one incoming limit order into a [`UnitOfWork`]:
//!
//! 1. Validate size, price and precision; draft the record with the next id
//! 2. Lock the order's full collateral (quote for buys, base for sells)
//! 3. Walk the opposite index best-first while the head is compatible:
//!    trade at the resting price for `min(remaining, resting remaining)`
//! 4. Close resting orders that fill completely
//! 5. Whatever is left rests on the order's own side
//!
//! `plan_cancel` releases a live order's remaining collateral and closes it.
//!
//! ## Self-Trade Handling
//!
//! Under [`SelfTradePolicy::Reject`] the first compatible resting order
//! owned by the submitter fails the whole submission. Under
//! [`SelfTradePolicy::Skip`] such orders are passed over and matching
//! continues behind them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sharebook_ledger::LedgerOp;
use sharebook_types::{
    MarketConfig, OrderId, OrderSide, Result, SelfTradePolicy, SharebookError, TraderId,
};

use crate::engine::BookState;
use crate::settlement::settle;
use crate::unit_of_work::UnitOfWork;

fn check_precision(value: Decimal, decimals: u32, what: &str) -> Result<()> {
    if value.normalize().scale() > decimals {
        return Err(SharebookError::invalid_order(format!(
            "{what} {value} has more than {decimals} decimal places"
        )));
    }
    Ok(())
}

/// Plan a new limit order against the current book.
pub(crate) fn plan_submission(
    state: &BookState,
    config: &MarketConfig,
    trader: TraderId,
    side: OrderSide,
    base_amount: Decimal,
    price: Decimal,
    now: DateTime<Utc>,
) -> Result<(OrderId, UnitOfWork)> {
    let mut incoming = state.store.draft(trader, side, base_amount, price, now)?;
    check_precision(base_amount, config.base_decimals, "base amount")?;
    check_precision(price, config.quote_decimals, "price")?;

    let mut uow = UnitOfWork::new(&state.stats);
    uow.push_op(LedgerOp::lock(
        trader,
        incoming.collateral_asset(&config.market),
        incoming.collateral_for(base_amount)?,
    ));

    for resting_id in state.index.ids(side.opposite()) {
        if incoming.remaining().is_zero() {
            break;
        }
        let mut resting = state.store.get(resting_id)?.clone();
        if !incoming.is_matchable_at(resting.price) {
            break;
        }
        if resting.trader == trader {
            match config.self_trade_policy {
                SelfTradePolicy::Reject => {
                    tracing::warn!(
                        trader = %trader,
                        resting_order = %resting.id,
                        "Self-trade rejected"
                    );
                    return Err(SharebookError::SelfTradeNotAllowed {
                        trader,
                        resting_order: resting.id,
                    });
                }
                SelfTradePolicy::Skip => {
                    tracing::warn!(
                        trader = %trader,
                        resting_order = %resting.id,
                        "Self-trade skipped"
                    );
                    continue;
                }
            }
        }

        let quantity = incoming.remaining().min(resting.remaining());
        settle(&mut uow, config, &mut incoming, &mut resting, quantity, now)?;

        if !resting.active {
            uow.unindex(resting.id);
        }
        uow.stage(resting);
    }

    let id = incoming.id;
    uow.create(incoming);
    Ok((id, uow))
}

/// Plan the cancellation of `id` on behalf of `caller`.
pub(crate) fn plan_cancel(
    state: &BookState,
    config: &MarketConfig,
    id: OrderId,
    caller: TraderId,
) -> Result<UnitOfWork> {
    let order = state.store.get(id)?;
    if order.trader != caller {
        return Err(SharebookError::Unauthorized {
            order_id: id,
            caller,
        });
    }
    if !order.active {
        return Err(SharebookError::AlreadyInactive(id));
    }

    let mut uow = UnitOfWork::new(&state.stats);
    uow.push_op(LedgerOp::release(
        order.trader,
        order.collateral_asset(&config.market),
        order.locked_collateral()?,
    ));

    let mut closed = order.clone();
    closed.active = false;
    uow.unindex(id);
    uow.stage(closed);
    Ok(uow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn precision_checked_after_normalising() {
        assert!(check_precision(Decimal::new(150, 2), 1, "price").is_ok());
        assert!(check_precision(Decimal::new(155, 2), 1, "price").is_err());
        assert!(check_precision(dec(3), 0, "amount").is_ok());
    }

    #[test]
    fn empty_book_plan_only_locks() {
        let state = BookState::default();
        let config = MarketConfig::default();
        let trader = TraderId::new();

        let (id, uow) = plan_submission(
            &state,
            &config,
            trader,
            OrderSide::Buy,
            dec(10),
            Decimal::new(15, 1),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(id, OrderId(1));
        assert_eq!(
            uow.ledger_ops(),
            &[LedgerOp::lock(trader, &config.market.quote, dec(15))]
        );
    }

    #[test]
    fn invalid_submission_plans_nothing() {
        let state = BookState::default();
        let config = MarketConfig::default();
        let result = plan_submission(
            &state,
            &config,
            TraderId::new(),
            OrderSide::Sell,
            Decimal::ZERO,
            dec(1),
            Utc::now(),
        );
        assert!(matches!(result, Err(SharebookError::InvalidOrder { .. })));
    }

    #[test]
    fn cancel_unknown_order_not_found() {
        let state = BookState::default();
        let result = plan_cancel(&state, &MarketConfig::default(), OrderId(3), TraderId::new());
        assert!(matches!(result, Err(SharebookError::NotFound(OrderId(3)))));
    }
}
