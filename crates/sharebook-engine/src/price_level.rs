//! A single price level in an active-order index.
//!
//! Ids at the same price are kept in ascending `sequence` order (time
//! priority) in a [`VecDeque`]. Since sequences are issued monotonically,
//! inserts are almost always a `push_back`.

use std::collections::VecDeque;

use rust_decimal::Decimal;
use sharebook_types::OrderId;

/// All resting order ids at one price.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    pub price: Decimal,
    /// `(sequence, id)` pairs, front = oldest = highest priority.
    entries: VecDeque<(u64, OrderId)>,
}

impl PriceLevel {
    #[must_use]
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            entries: VecDeque::new(),
        }
    }

    /// Insert at the position its sequence dictates.
    pub fn insert(&mut self, sequence: u64, id: OrderId) {
        let pos = self.entries.partition_point(|(seq, _)| *seq < sequence);
        self.entries.insert(pos, (sequence, id));
    }

    /// Remove a specific id. Returns `false` if it was not here.
    pub fn remove(&mut self, id: OrderId) -> bool {
        match self.entries.iter().position(|(_, o)| *o == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Ids in time-priority order.
    pub fn ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.entries.iter().map(|(_, id)| *id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
