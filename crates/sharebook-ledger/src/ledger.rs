//! The asset-ledger capability consumed by the matching engine.

use rust_decimal::Decimal;
use sharebook_types::{Asset, BalanceEntry, Result, TraderId};

/// One custody primitive, recorded so a whole operation can be applied
/// (or discarded) as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOp {
    /// available → locked
    Lock {
        account: TraderId,
        asset: Asset,
        amount: Decimal,
    },
    /// locked → available
    Release {
        account: TraderId,
        asset: Asset,
        amount: Decimal,
    },
    /// `from` available → `to` available
    Transfer {
        from: TraderId,
        to: TraderId,
        asset: Asset,
        amount: Decimal,
    },
}

impl LedgerOp {
    #[must_use]
    pub fn lock(account: TraderId, asset: &str, amount: Decimal) -> Self {
        Self::Lock {
            account,
            asset: asset.to_string(),
            amount,
        }
    }

    #[must_use]
    pub fn release(account: TraderId, asset: &str, amount: Decimal) -> Self {
        Self::Release {
            account,
            asset: asset.to_string(),
            amount,
        }
    }

    #[must_use]
    pub fn transfer(from: TraderId, to: TraderId, asset: &str, amount: Decimal) -> Self {
        Self::Transfer {
            from,
            to,
            asset: asset.to_string(),
            amount,
        }
    }

    /// The op that undoes this one on balances.
    #[must_use]
    pub fn inverse(&self) -> Self {
        match self {
            Self::Lock {
                account,
                asset,
                amount,
            } => Self::release(*account, asset, *amount),
            Self::Release {
                account,
                asset,
                amount,
            } => Self::lock(*account, asset, *amount),
            Self::Transfer {
                from,
                to,
                asset,
                amount,
            } => Self::transfer(*to, *from, asset, *amount),
        }
    }

    #[must_use]
    pub fn amount(&self) -> Decimal {
        match self {
            Self::Lock { amount, .. } | Self::Release { amount, .. } | Self::Transfer { amount, .. } => {
                *amount
            }
        }
    }
}

/// Custodial ledger of base and quote balances.
///
/// Each primitive fails with `InsufficientBalance`, `InsufficientLocked` or
/// `InsufficientAllowance` when funds are unavailable, and must leave the
/// ledger unchanged when it fails.
pub trait AssetLedger {
    /// Move `amount` from the account's available balance into its lock.
    fn lock_funds(&mut self, account: TraderId, asset: &str, amount: Decimal) -> Result<()>;

    /// Move `amount` from the account's lock back to available.
    fn release_funds(&mut self, account: TraderId, asset: &str, amount: Decimal) -> Result<()>;

    /// Move `amount` of available balance between accounts.
    fn transfer(&mut self, from: TraderId, to: TraderId, asset: &str, amount: Decimal)
    -> Result<()>;

    /// Current balance of an account. Unknown accounts read as zero.
    fn balance(&self, account: TraderId, asset: &str) -> BalanceEntry;

    /// Dispatch a single recorded op.
    fn apply(&mut self, op: &LedgerOp) -> Result<()> {
        match op {
            LedgerOp::Lock {
                account,
                asset,
                amount,
            } => self.lock_funds(*account, asset, *amount),
            LedgerOp::Release {
                account,
                asset,
                amount,
            } => self.release_funds(*account, asset, *amount),
            LedgerOp::Transfer {
                from,
                to,
                asset,
                amount,
            } => self.transfer(*from, *to, asset, *amount),
        }
    }

    /// Apply every op in order, or none of them.
    ///
    /// The default implementation compensates: on the first failure it
    /// applies the inverse of each already-applied op in reverse order.
    /// Ledgers with side state the inverses cannot restore (allowances,
    /// fees, external journals) should override this.
    fn apply_batch(&mut self, ops: &[LedgerOp]) -> Result<()> {
        for (applied, op) in ops.iter().enumerate() {
            if let Err(err) = self.apply(op) {
                for done in ops[..applied].iter().rev() {
                    if let Err(undo_err) = self.apply(&done.inverse()) {
                        tracing::error!(
                            op = ?done,
                            error = %undo_err,
                            "Ledger compensation failed; balances may be inconsistent"
                        );
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}
