//! Deterministic digest of the committed book state.
//!
//! Two engines fed the same operation sequence must end with the same
//! digest, and an operation that fails must leave it unchanged. Wall-clock
//! timestamps are excluded; everything else that defines the book is in.

use sha2::{Digest, Sha256};
use sharebook_types::{MarketStats, OrderSide};

use crate::{ActiveIndex, OrderStore};

/// SHA-256 over every order record, both index enumerations and the stats.
#[must_use]
pub fn compute_state_digest(
    store: &OrderStore,
    index: &ActiveIndex,
    stats: &MarketStats,
) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"sharebook:state:v1:");
    hasher.update((store.len() as u64).to_le_bytes());

    for order in store.iter() {
        hasher.update(order.id.0.to_le_bytes());
        hasher.update(order.trader.as_bytes());
        hasher.update([u8::from(order.side == OrderSide::Buy)]);
        hasher.update(order.base_amount.normalize().to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(order.filled.normalize().to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(order.price.normalize().to_string().as_bytes());
        hasher.update([u8::from(order.active)]);
        hasher.update(order.sequence.to_le_bytes());
    }

    for side in [OrderSide::Buy, OrderSide::Sell] {
        hasher.update(b"side:");
        for id in index.ids(side) {
            hasher.update(id.0.to_le_bytes());
        }
    }

    hasher.update(b"stats:");
    hasher.update(stats.total_volume.normalize().to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(stats.total_trades.to_le_bytes());
    hasher.update(stats.fees_collected.normalize().to_string().as_bytes());

    hasher.finalize().into()
}
