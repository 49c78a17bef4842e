//! Fill records produced by the matching engine.
//!
//! A [`Fill`] describes one settlement between the incoming (taker) order
//! and one resting (maker) order. Fills are returned to the caller and
//! logged; only their aggregates are retained by the engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderId, OrderSide, TraderId};

/// A single executed match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// Trade number, equal to `total_trades` right after this fill.
    pub trade_seq: u64,
    /// The incoming (taker) order ID.
    pub taker_order_id: OrderId,
    pub taker: TraderId,
    /// The resting (maker) order ID.
    pub maker_order_id: OrderId,
    pub maker: TraderId,
    /// Which side the taker was on.
    pub taker_side: OrderSide,
    /// Execution price: always the maker's limit.
    pub price: Decimal,
    /// Executed quantity in base units.
    pub quantity: Decimal,
    /// `price * quantity`, in quote units.
    pub quote_amount: Decimal,
    /// Protocol fee taken out of `quote_amount`.
    pub fee: Decimal,
    pub executed_at: DateTime<Utc>,
}

impl Fill {
    #[must_use]
    pub fn taker_is_buyer(&self) -> bool {
        self.taker_side == OrderSide::Buy
    }

    /// `(buyer, seller)` accounts.
    #[must_use]
    pub fn counterparties(&self) -> (TraderId, TraderId) {
        if self.taker_is_buyer() {
            (self.taker, self.maker)
        } else {
            (self.maker, self.taker)
        }
    }

    /// `(buy order, sell order)` ids.
    #[must_use]
    pub fn order_ids(&self) -> (OrderId, OrderId) {
        if self.taker_is_buyer() {
            (self.taker_order_id, self.maker_order_id)
        } else {
            (self.maker_order_id, self.taker_order_id)
        }
    }

    /// Quote the seller receives after the fee.
    #[must_use]
    pub fn seller_proceeds(&self) -> Decimal {
        self.quote_amount - self.fee
    }
}

impl std::fmt::Display for Fill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Fill[{}] {} {} {} @ {} = {} (fee {})",
            self.trade_seq,
            self.taker_order_id,
            self.taker_side,
            self.quantity,
            self.price,
            self.quote_amount,
            self.fee,
        )
    }
}
