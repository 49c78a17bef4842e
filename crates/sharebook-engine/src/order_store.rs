//! Append-only store of every order ever created.
//!
//! Ids are dense and start at [`constants::FIRST_ORDER_ID`], so a record is
//! found by offset. Records are never removed; terminal orders stay
//! readable for history lookups.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sharebook_types::{
    Order, OrderId, OrderSide, Result, SharebookError, TraderId, constants,
};

#[derive(Debug)]
pub struct OrderStore {
    orders: Vec<Order>,
    /// Every id a trader created, oldest first.
    by_trader: HashMap<TraderId, Vec<OrderId>>,
    next_id: OrderId,
}

impl Default for OrderStore {
    fn default() -> Self {
        Self {
            orders: Vec::new(),
            by_trader: HashMap::new(),
            next_id: OrderId(constants::FIRST_ORDER_ID),
        }
    }
}

impl OrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next created order will receive.
    #[must_use]
    pub fn next_id(&self) -> OrderId {
        self.next_id
    }

    /// Build the record the next `create_order` would write, without
    /// writing it.
    ///
    /// # Errors
    /// `InvalidOrder` when `base_amount` or `price` is not positive.
    pub fn draft(
        &self,
        trader: TraderId,
        side: OrderSide,
        base_amount: Decimal,
        price: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<Order> {
        if base_amount <= Decimal::ZERO {
            return Err(SharebookError::invalid_order(format!(
                "base amount must be positive, got {base_amount}"
            )));
        }
        if price <= Decimal::ZERO {
            return Err(SharebookError::invalid_order(format!(
                "price must be positive, got {price}"
            )));
        }
        Ok(Order {
            id: self.next_id,
            trader,
            side,
            base_amount,
            filled: Decimal::ZERO,
            price,
            active: true,
            sequence: self.next_id.0,
            created_at,
        })
    }

    /// Validate, assign the next id and write a fresh active record.
    pub fn create_order(
        &mut self,
        trader: TraderId,
        side: OrderSide,
        base_amount: Decimal,
        price: Decimal,
    ) -> Result<OrderId> {
        let order = self.draft(trader, side, base_amount, price, Utc::now())?;
        let id = order.id;
        self.append(order);
        Ok(id)
    }

    /// Write a drafted record. The record must carry [`Self::next_id`].
    pub(crate) fn append(&mut self, order: Order) {
        debug_assert_eq!(order.id, self.next_id, "orders must be appended in id order");
        self.next_id = order.id.next();
        self.by_trader.entry(order.trader).or_default().push(order.id);
        self.orders.push(order);
    }

    /// Overwrite an existing record with its advanced state.
    pub(crate) fn replace(&mut self, order: Order) {
        let Some(idx) = self.slot(order.id) else {
            return;
        };
        if let Some(slot) = self.orders.get_mut(idx) {
            *slot = order;
        }
    }

    fn slot(&self, id: OrderId) -> Option<usize> {
        let offset = id.0.checked_sub(constants::FIRST_ORDER_ID)?;
        usize::try_from(offset).ok()
    }

    /// # Errors
    /// `NotFound` if `id` was never issued.
    pub fn get(&self, id: OrderId) -> Result<&Order> {
        self.slot(id)
            .and_then(|idx| self.orders.get(idx))
            .ok_or(SharebookError::NotFound(id))
    }

    /// Every id `trader` ever created, oldest first, regardless of state.
    pub fn user_orders(&self, trader: TraderId) -> impl Iterator<Item = OrderId> + '_ {
        self.by_trader
            .get(&trader)
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    /// All records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
