//! Order types for the ShareBook matching engine.
//!
//! An [`Order`] is created once by the order store and then only ever has
//! its `filled` and `active` fields advanced. Size, price, side and owner
//! are fixed for the life of the record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MarketPair, OrderId, Result, TraderId, exact_mul};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// The side an order of this side matches against.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Lifecycle status of an order, derived from `filled` and `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Active,
    PartiallyFilled,
    Filled,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Core order record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub trader: TraderId,
    pub side: OrderSide,
    /// Original requested size in base units.
    pub base_amount: Decimal,
    /// Cumulative matched quantity, `0 <= filled <= base_amount`.
    pub filled: Decimal,
    /// Limit price in quote units per base unit.
    pub price: Decimal,
    pub active: bool,
    /// Time-priority marker; lower sequences match first at equal prices.
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Unfilled quantity.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.base_amount - self.filled
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.filled == self.base_amount
    }

    #[must_use]
    pub fn status(&self) -> OrderStatus {
        match (self.active, self.filled.is_zero(), self.is_filled()) {
            (true, true, _) => OrderStatus::Active,
            (true, false, _) => OrderStatus::PartiallyFilled,
            (false, _, true) => OrderStatus::Filled,
            (false, _, false) => OrderStatus::Cancelled,
        }
    }

    /// Whether a resting order at `price` on the opposite side is
    /// compatible with this order's limit.
    #[must_use]
    pub fn is_matchable_at(&self, price: Decimal) -> bool {
        match self.side {
            OrderSide::Buy => self.price >= price,
            OrderSide::Sell => self.price <= price,
        }
    }

    /// Asset this order locks as collateral: quote for buys, base for sells.
    #[must_use]
    pub fn collateral_asset<'a>(&self, market: &'a MarketPair) -> &'a str {
        match self.side {
            OrderSide::Buy => &market.quote,
            OrderSide::Sell => &market.base,
        }
    }

    /// Collateral that must be locked for `quantity` of this order.
    pub fn collateral_for(&self, quantity: Decimal) -> Result<Decimal> {
        match self.side {
            OrderSide::Buy => exact_mul(quantity, self.price, "buy order collateral"),
            OrderSide::Sell => Ok(quantity),
        }
    }

    /// Collateral currently locked on this order's behalf: the unfilled
    /// notional while active, zero once terminal.
    pub fn locked_collateral(&self) -> Result<Decimal> {
        if self.active {
            self.collateral_for(self.remaining())
        } else {
            Ok(Decimal::ZERO)
        }
    }
}
