//! Running market statistics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Fill, Result, SharebookError};

/// Process-wide accumulator, mutated only by settlement.
///
/// All three counters are monotonically non-decreasing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStats {
    /// Sum of fill quantities, in base units.
    pub total_volume: Decimal,
    /// Number of fills.
    pub total_trades: u64,
    /// Sum of fees taken, in quote units.
    pub fees_collected: Decimal,
}

impl MarketStats {
    /// Fold one fill into the totals.
    pub fn record(&mut self, fill: &Fill) -> Result<()> {
        let total_volume = self
            .total_volume
            .checked_add(fill.quantity)
            .ok_or_else(|| SharebookError::overflow("total volume"))?;
        let fees_collected = self
            .fees_collected
            .checked_add(fill.fee)
            .ok_or_else(|| SharebookError::overflow("fees collected"))?;
        let total_trades = self
            .total_trades
            .checked_add(1)
            .ok_or_else(|| SharebookError::overflow("trade count"))?;

        self.total_volume = total_volume;
        self.fees_collected = fees_collected;
        self.total_trades = total_trades;
        Ok(())
    }

    /// `(total_volume, total_trades, fees_collected)`.
    #[must_use]
    pub fn as_tuple(&self) -> (Decimal, u64, Decimal) {
        (self.total_volume, self.total_trades, self.fees_collected)
    }
}
