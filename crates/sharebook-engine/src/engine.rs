//! The order book facade.
//!
//! [`OrderBookEngine`] owns one market's order store, active indexes and
//! statistics, plus the ledger that holds its traders' funds. Every public
//! mutation is planned against the current state and then committed as a
//! whole; a failure at any stage leaves the book, the stats and the ledger
//! exactly as they were.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sharebook_ledger::{AssetLedger, InMemoryLedger};
use sharebook_types::{
    Asset, Fill, MarketConfig, MarketStats, Order, OrderId, OrderSide, OrderStatus, Result,
    SharebookError, TraderId, constants,
};

use crate::digest::compute_state_digest;
use crate::matcher::{plan_cancel, plan_submission};
use crate::{ActiveIndex, OrderStore};

/// Committed in-memory state of one market.
#[derive(Debug, Default)]
pub(crate) struct BookState {
    pub(crate) store: OrderStore,
    pub(crate) index: ActiveIndex,
    pub(crate) stats: MarketStats,
}

/// Outcome of one accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub filled: Decimal,
    /// Quantity left resting on the book (zero if fully filled).
    pub remaining: Decimal,
    /// Fills in execution order.
    pub fills: Vec<Fill>,
}

impl ExecutionReport {
    /// Whether any part of the order remains on the book.
    #[must_use]
    pub fn is_resting(&self) -> bool {
        self.status == OrderStatus::Active || self.status == OrderStatus::PartiallyFilled
    }
}

/// Continuous limit order book for one share/stable market.
#[derive(Debug)]
pub struct OrderBookEngine<L: AssetLedger = InMemoryLedger> {
    config: MarketConfig,
    state: BookState,
    ledger: L,
}

impl<L: AssetLedger> OrderBookEngine<L> {
    /// # Errors
    /// `Configuration` if `config` fails validation.
    pub fn new(config: MarketConfig, ledger: L) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            market = %config.symbol(),
            fee_bps = config.fee_rate_bps,
            "Order book opened"
        );
        Ok(Self {
            config,
            state: BookState::default(),
            ledger,
        })
    }

    /// Submit a limit order, match it against the opposite side and rest
    /// whatever is left.
    ///
    /// # Errors
    /// `InvalidOrder`, `SelfTradeNotAllowed`, `ArithmeticOverflow` or any
    /// ledger error. On error nothing has changed and no id was consumed.
    pub fn submit_order(
        &mut self,
        trader: TraderId,
        side: OrderSide,
        base_amount: Decimal,
        price: Decimal,
    ) -> Result<ExecutionReport> {
        let planned = plan_submission(
            &self.state,
            &self.config,
            trader,
            side,
            base_amount,
            price,
            Utc::now(),
        );
        let (order_id, uow) = planned.inspect_err(|err| {
            tracing::warn!(trader = %trader, side = %side, error = %err, "Submission rolled back");
        })?;
        let fills = uow
            .commit(&mut self.state, &mut self.ledger)
            .inspect_err(|err| {
                tracing::warn!(trader = %trader, side = %side, error = %err, "Submission rolled back");
            })?;

        let order = self.state.store.get(order_id)?;
        tracing::info!(
            order = %order_id,
            trader = %trader,
            side = %side,
            qty = %base_amount,
            price = %price,
            fills = fills.len(),
            status = %order.status(),
            "Order accepted"
        );
        Ok(ExecutionReport {
            order_id,
            status: order.status(),
            filled: order.filled,
            remaining: if order.active {
                order.remaining()
            } else {
                Decimal::ZERO
            },
            fills,
        })
    }

    /// # Errors
    /// See [`Self::submit_order`].
    pub fn create_buy_order(
        &mut self,
        trader: TraderId,
        base_amount: Decimal,
        price: Decimal,
    ) -> Result<OrderId> {
        self.submit_order(trader, OrderSide::Buy, base_amount, price)
            .map(|report| report.order_id)
    }

    /// # Errors
    /// See [`Self::submit_order`].
    pub fn create_sell_order(
        &mut self,
        trader: TraderId,
        base_amount: Decimal,
        price: Decimal,
    ) -> Result<OrderId> {
        self.submit_order(trader, OrderSide::Sell, base_amount, price)
            .map(|report| report.order_id)
    }

    /// Close a live order and return its remaining collateral.
    ///
    /// # Errors
    /// `NotFound`, `Unauthorized` (caller is not the owner) or
    /// `AlreadyInactive`, checked in that order.
    pub fn cancel_order(&mut self, id: OrderId, caller: TraderId) -> Result<()> {
        let uow = plan_cancel(&self.state, &self.config, id, caller)?;
        uow.commit(&mut self.state, &mut self.ledger)
            .inspect_err(|err| {
                tracing::warn!(order = %id, error = %err, "Cancel rolled back");
            })?;
        tracing::info!(order = %id, trader = %caller, "Order cancelled");
        Ok(())
    }

    /// # Errors
    /// `NotFound` if `id` was never issued.
    pub fn get_order(&self, id: OrderId) -> Result<&Order> {
        self.state.store.get(id)
    }

    /// Every order `trader` ever created, oldest first.
    pub fn user_orders(&self, trader: TraderId) -> impl Iterator<Item = OrderId> + '_ {
        self.state.store.user_orders(trader)
    }

    /// Live buy ids, best price first, then oldest first.
    pub fn active_buy_orders(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.state.index.ids(OrderSide::Buy)
    }

    /// Live sell ids, best price first, then oldest first.
    pub fn active_sell_orders(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.state.index.ids(OrderSide::Sell)
    }

    #[must_use]
    pub fn market_stats(&self) -> &MarketStats {
        &self.state.stats
    }

    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.state.index.best_bid()
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.state.index.best_ask()
    }

    #[must_use]
    pub fn spread(&self) -> Option<Decimal> {
        self.state.index.spread()
    }

    /// Number of distinct bid price levels.
    #[must_use]
    pub fn bid_depth(&self) -> usize {
        self.state.index.bid_depth()
    }

    /// Number of distinct ask price levels.
    #[must_use]
    pub fn ask_depth(&self) -> usize {
        self.state.index.ask_depth()
    }

    /// Orders ever created, live or not.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.state.store.len()
    }

    #[must_use]
    pub fn active_order_count(&self) -> usize {
        self.state.index.len()
    }

    /// Collateral the ledger should be holding for `order` right now.
    ///
    /// # Errors
    /// `ArithmeticOverflow` if the notional does not fit.
    pub fn locked_collateral(&self, order: &Order) -> Result<Decimal> {
        order.locked_collateral()
    }

    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Direct ledger access for deposits and approvals.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// Hex SHA-256 of the committed book state.
    #[must_use]
    pub fn state_digest(&self) -> String {
        hex::encode(compute_state_digest(
            &self.state.store,
            &self.state.index,
            &self.state.stats,
        ))
    }

    /// Check that every trader's locked ledger balance equals the
    /// collateral their active orders still need.
    ///
    /// Assumes the ledger holds no locks on behalf of anyone else.
    ///
    /// # Errors
    /// `CollateralMismatch` on the first disagreement.
    pub fn verify_collateral(&self) -> Result<()> {
        let market = &self.config.market;
        let mut expected: BTreeMap<(TraderId, Asset), Decimal> = BTreeMap::new();
        for order in self.state.store.iter() {
            for asset in [&market.base, &market.quote] {
                expected.entry((order.trader, asset.clone())).or_default();
            }
            let needed = order.locked_collateral()?;
            let slot = expected
                .entry((order.trader, order.collateral_asset(market).to_owned()))
                .or_default();
            *slot = slot
                .checked_add(needed)
                .ok_or_else(|| SharebookError::overflow("expected collateral"))?;
        }

        for ((trader, asset), needed) in expected {
            let locked = self.ledger.balance(trader, &asset).locked;
            if locked != needed {
                tracing::error!(trader = %trader, asset = %asset, expected = %needed, locked = %locked, "Collateral mismatch");
                return Err(SharebookError::CollateralMismatch {
                    trader,
                    asset,
                    expected: needed,
                    locked,
                });
            }
        }
        Ok(())
    }
}
