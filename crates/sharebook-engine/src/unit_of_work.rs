//! Plan-then-commit unit of work.
//!
//! A public operation never mutates the book while it is still deciding
//! what to do. The matcher and settlement write their intent here:
//! ledger ops, advanced order records, index removals, the new order and
//! the staged statistics. Only when planning succeeded end to end does
//! [`UnitOfWork::commit`] hand the ledger ops to the ledger as one atomic
//! batch and then apply the in-memory changes, which cannot fail.
//!
//! Dropping a `UnitOfWork` discards it with no effect.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sharebook_ledger::{AssetLedger, LedgerOp};
use sharebook_types::{Fill, MarketStats, Order, OrderId, Result};

use crate::engine::BookState;

#[derive(Debug)]
pub(crate) struct UnitOfWork {
    ledger_ops: Vec<LedgerOp>,
    /// Advanced copies of records already in the store.
    updates: BTreeMap<OrderId, Order>,
    /// The order created by this operation, if any.
    created: Option<Order>,
    unindex: Vec<OrderId>,
    stats: MarketStats,
    fills: Vec<Fill>,
}

impl UnitOfWork {
    pub(crate) fn new(stats: &MarketStats) -> Self {
        Self {
            ledger_ops: Vec::new(),
            updates: BTreeMap::new(),
            created: None,
            unindex: Vec::new(),
            stats: stats.clone(),
            fills: Vec::new(),
        }
    }

    /// Queue a ledger primitive. Zero-amount movements are dropped.
    pub(crate) fn push_op(&mut self, op: LedgerOp) {
        if op.amount() > Decimal::ZERO {
            self.ledger_ops.push(op);
        }
    }

    /// Stage the advanced state of an existing record.
    pub(crate) fn stage(&mut self, order: Order) {
        self.updates.insert(order.id, order);
    }

    /// Stage the record created by this operation.
    pub(crate) fn create(&mut self, order: Order) {
        self.created = Some(order);
    }

    pub(crate) fn unindex(&mut self, id: OrderId) {
        self.unindex.push(id);
    }

    /// Sequence number the next recorded fill will carry.
    pub(crate) fn next_trade_seq(&self) -> u64 {
        self.stats.total_trades.saturating_add(1)
    }

    pub(crate) fn record_fill(&mut self, fill: Fill) -> Result<()> {
        self.stats.record(&fill)?;
        self.fills.push(fill);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn ledger_ops(&self) -> &[LedgerOp] {
        &self.ledger_ops
    }

    /// Apply the ledger batch, then the book changes.
    ///
    /// If the ledger rejects the batch nothing else is touched.
    pub(crate) fn commit<L: AssetLedger>(
        self,
        state: &mut BookState,
        ledger: &mut L,
    ) -> Result<Vec<Fill>> {
        let Self {
            ledger_ops,
            updates,
            created,
            unindex,
            stats,
            fills,
        } = self;

        ledger.apply_batch(&ledger_ops)?;

        for order in updates.into_values() {
            state.store.replace(order);
        }
        for id in unindex {
            state.index.remove(id);
        }
        if let Some(order) = created {
            if order.active {
                state.index.insert(&order);
            }
            state.store.append(order);
        }
        state.stats = stats;
        Ok(fills)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sharebook_ledger::InMemoryLedger;
    use sharebook_types::{OrderSide, SharebookError, TraderId};

    use super::*;

    #[test]
    fn zero_amount_ops_are_dropped() {
        let mut uow = UnitOfWork::new(&MarketStats::default());
        let t = TraderId::new();
        uow.push_op(LedgerOp::lock(t, "USDC", Decimal::ZERO));
        uow.push_op(LedgerOp::lock(t, "USDC", Decimal::ONE));
        assert_eq!(uow.ledger_ops().len(), 1);
    }

    #[test]
    fn rejected_ledger_batch_leaves_book_untouched() {
        let mut state = BookState::default();
        let mut ledger = InMemoryLedger::new();
        let trader = TraderId::new();

        let order = state
            .store
            .draft(trader, OrderSide::Buy, Decimal::ONE, Decimal::ONE, Utc::now())
            .unwrap();
        let mut uow = UnitOfWork::new(&state.stats);
        uow.push_op(LedgerOp::lock(trader, "USDC", Decimal::ONE));
        uow.create(order);

        let err = uow.commit(&mut state, &mut ledger).unwrap_err();
        assert!(matches!(err, SharebookError::InsufficientBalance { .. }));
        assert!(state.store.is_empty());
        assert!(state.index.is_empty());
    }

    #[test]
    fn commit_appends_and_indexes_active_order() {
        let mut state = BookState::default();
        let mut ledger = InMemoryLedger::new();
        let trader = TraderId::new();

        let order = state
            .store
            .draft(trader, OrderSide::Sell, Decimal::ONE, Decimal::ONE, Utc::now())
            .unwrap();
        let id = order.id;
        let mut uow = UnitOfWork::new(&state.stats);
        uow.create(order);

        let fills = uow.commit(&mut state, &mut ledger).unwrap();
        assert!(fills.is_empty());
        assert!(state.store.get(id).unwrap().active);
        assert!(state.index.contains(id));
    }
}
