//! Active-order indexes for both sides of the book.
//!
//! Uses `BTreeMap` for price-level ordering:
//! - **Bids** (buys): `BTreeMap<Reverse<Decimal>, PriceLevel>` -- highest price first
//! - **Asks** (sells): `BTreeMap<Decimal, PriceLevel>` -- lowest price first
//!
//! Levels hold ids only; the [`OrderStore`](crate::OrderStore) owns the
//! records. An auxiliary `HashMap<OrderId, (Side, Price)>` gives O(log N)
//! removal.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use sharebook_types::{Order, OrderId, OrderSide};

use crate::price_level::PriceLevel;

/// Ids of every order still eligible for matching, per side, in
/// price-time priority.
#[derive(Debug, Default)]
pub struct ActiveIndex {
    bids: BTreeMap<Reverse<Decimal>, PriceLevel>,
    asks: BTreeMap<Decimal, PriceLevel>,
    index: HashMap<OrderId, (OrderSide, Decimal)>,
}

impl ActiveIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =================================================================
    // Mutation
    // =================================================================

    /// Insert a resting order. Returns `false` if the id is already indexed.
    pub fn insert(&mut self, order: &Order) -> bool {
        if self.index.contains_key(&order.id) {
            return false;
        }
        self.index.insert(order.id, (order.side, order.price));

        let level = match order.side {
            OrderSide::Buy => self
                .bids
                .entry(Reverse(order.price))
                .or_insert_with(|| PriceLevel::new(order.price)),
            OrderSide::Sell => self
                .asks
                .entry(order.price)
                .or_insert_with(|| PriceLevel::new(order.price)),
        };
        level.insert(order.sequence, order.id);
        true
    }

    /// Remove an id from its side. Returns the side it was on, or `None`.
    pub fn remove(&mut self, id: OrderId) -> Option<OrderSide> {
        let (side, price) = self.index.remove(&id)?;
        match side {
            OrderSide::Buy => {
                if let Some(level) = self.bids.get_mut(&Reverse(price)) {
                    level.remove(id);
                    if level.is_empty() {
                        self.bids.remove(&Reverse(price));
                    }
                }
            }
            OrderSide::Sell => {
                if let Some(level) = self.asks.get_mut(&price) {
                    level.remove(id);
                    if level.is_empty() {
                        self.asks.remove(&price);
                    }
                }
            }
        }
        Some(side)
    }

    // =================================================================
    // Iteration (for the matcher and the query surface)
    // =================================================================

    /// Iterate bid levels from best (highest) to worst.
    pub fn bid_levels(&self) -> impl Iterator<Item = &PriceLevel> {
        self.bids.values()
    }

    /// Iterate ask levels from best (lowest) to worst.
    pub fn ask_levels(&self) -> impl Iterator<Item = &PriceLevel> {
        self.asks.values()
    }

    /// Levels of one side, best first.
    pub fn levels(&self, side: OrderSide) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match side {
            OrderSide::Buy => Box::new(self.bid_levels()),
            OrderSide::Sell => Box::new(self.ask_levels()),
        }
    }

    /// Ids of one side in price-time priority.
    pub fn ids(&self, side: OrderSide) -> impl Iterator<Item = OrderId> + '_ {
        self.levels(side).flat_map(PriceLevel::ids)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Best (highest) bid price, or `None` if no bids.
    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next().map(|r| r.0)
    }

    /// Best (lowest) ask price, or `None` if no asks.
    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    /// Spread = `best_ask - best_bid`. `None` if either side is empty.
    #[must_use]
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Number of distinct bid price levels.
    #[must_use]
    pub fn bid_depth(&self) -> usize {
        self.bids.len()
    }

    /// Number of distinct ask price levels.
    #[must_use]
    pub fn ask_depth(&self) -> usize {
        self.asks.len()
    }

    #[must_use]
    pub fn contains(&self, id: OrderId) -> bool {
        self.index.contains_key(&id)
    }

    /// Total number of indexed ids on both sides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
