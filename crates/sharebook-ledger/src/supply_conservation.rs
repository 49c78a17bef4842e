//! Supply conservation invariant checker.
//!
//! Invariant held by the ledger at every quiescent point:
//! ```text
//! ∀ asset: Σ(available + locked) == Σ(deposits) - Σ(withdrawals)
//! ```
//!
//! Locks, releases, transfers and fee payments only move balances between
//! accounts, so no amount of trading may change either side.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sharebook_types::{Asset, Result, SharebookError};

fn accumulate(
    totals: &mut HashMap<Asset, Decimal>,
    asset: &str,
    amount: Decimal,
    context: &str,
) -> Result<()> {
    let total = totals.entry(asset.to_string()).or_default();
    *total = total
        .checked_add(amount)
        .ok_or_else(|| SharebookError::overflow(format!("{context} of {asset}")))?;
    Ok(())
}

/// Tracks per-asset inflows and outflows across the ledger boundary.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    deposits: HashMap<Asset, Decimal>,
    withdrawals: HashMap<Asset, Decimal>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// `ArithmeticOverflow` if the running total would not fit; nothing is
    /// recorded in that case.
    pub fn record_deposit(&mut self, asset: &str, amount: Decimal) -> Result<()> {
        accumulate(&mut self.deposits, asset, amount, "total deposits")
    }

    /// # Errors
    /// `ArithmeticOverflow` if the running total would not fit.
    pub fn record_withdrawal(&mut self, asset: &str, amount: Decimal) -> Result<()> {
        accumulate(&mut self.withdrawals, asset, amount, "total withdrawals")
    }

    #[must_use]
    pub fn total_deposits(&self, asset: &str) -> Decimal {
        self.deposits.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn total_withdrawals(&self, asset: &str) -> Decimal {
        self.withdrawals.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Expected total supply for an asset: deposits - withdrawals.
    /// Withdrawals never exceed deposits, so this cannot overflow.
    #[must_use]
    pub fn expected_supply(&self, asset: &str) -> Decimal {
        self.total_deposits(asset) - self.total_withdrawals(asset)
    }

    /// Compare the ledger's actual supply with the expected one.
    ///
    /// # Errors
    /// Returns [`SharebookError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, asset: &str, actual_supply: Decimal) -> Result<()> {
        let expected = self.expected_supply(asset);
        if actual_supply != expected {
            return Err(SharebookError::SupplyInvariantViolation {
                reason: format!(
                    "Asset {asset}: actual supply {actual_supply} != expected {expected} \
                     (deposits={}, withdrawals={})",
                    self.total_deposits(asset),
                    self.total_withdrawals(asset),
                ),
            });
        }
        Ok(())
    }
}
