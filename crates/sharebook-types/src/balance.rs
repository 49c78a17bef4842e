//! Balance tracking types for the custodial asset ledger.
//!
//! Every account has an `available` balance (free to lock, transfer or
//! withdraw) and a `locked` balance (collateral held for active orders).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single balance entry for an (account, asset) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceEntry {
    /// Free balance.
    pub available: Decimal,
    /// Collateral locked for active orders.
    pub locked: Decimal,
}

impl BalanceEntry {
    /// Total balance (available + locked).
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.available + self.locked
    }

    /// Whether this entry has no balance at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.available.is_zero() && self.locked.is_zero()
    }
}

/// Type alias for asset identifiers (e.g., "SHARE", "USDC").
pub type Asset = String;
