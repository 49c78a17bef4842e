//! In-memory custodial ledger tracking available and locked balances.
//!
//! The [`InMemoryLedger`] tracks per-(account, asset) balances with two
//! components:
//! - **Available**: can be locked, transferred or withdrawn
//! - **Locked**: collateral held for active orders
//!
//! When [`LedgerConfig::enforce_allowance`] is set, an account must first
//! `approve` the book for an asset; each lock spends that allowance.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use sharebook_types::{
    Asset, BalanceEntry, LedgerConfig, Result, SharebookError, TraderId,
};

use crate::ledger::{AssetLedger, LedgerOp};
use crate::supply_conservation::SupplyConservation;

type Key = (TraderId, Asset);

/// In-memory ledger for all accounts and assets of one market.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    config: LedgerConfig,
    /// `(TraderId, Asset) → BalanceEntry`
    balances: HashMap<Key, BalanceEntry>,
    /// `(TraderId, Asset) → remaining approved amount`
    allowances: HashMap<Key, Decimal>,
    supply: SupplyConservation,
}

fn add(a: Decimal, b: Decimal, context: &str) -> Result<Decimal> {
    a.checked_add(b).ok_or_else(|| SharebookError::overflow(context))
}

fn sub(a: Decimal, b: Decimal, context: &str) -> Result<Decimal> {
    a.checked_sub(b).ok_or_else(|| SharebookError::overflow(context))
}

fn ensure_positive(amount: Decimal, what: &str) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(SharebookError::InvalidAmount {
            reason: format!("{what} amount must be positive, got {amount}"),
        });
    }
    Ok(())
}

impl InMemoryLedger {
    /// Create a new empty ledger with default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Write an entry computed from [`AssetLedger::balance`]. Primitives
    /// build the new entry first so a failed check leaves nothing behind.
    fn store(&mut self, account: TraderId, asset: &str, entry: BalanceEntry) {
        self.balances.insert((account, asset.to_string()), entry);
    }

    // =================================================================
    // Funding
    // =================================================================

    /// Credit an account's available balance from outside the ledger.
    pub fn deposit(&mut self, account: TraderId, asset: &str, amount: Decimal) -> Result<()> {
        ensure_positive(amount, "Deposit")?;
        let mut entry = self.balance(account, asset);
        entry.available = add(entry.available, amount, "available balance")?;
        self.supply.record_deposit(asset, amount)?;
        self.store(account, asset, entry);
        Ok(())
    }

    /// Debit an account's available balance to outside the ledger.
    pub fn withdraw(&mut self, account: TraderId, asset: &str, amount: Decimal) -> Result<()> {
        ensure_positive(amount, "Withdraw")?;
        let mut entry = self.balance(account, asset);
        if entry.available < amount {
            return Err(SharebookError::InsufficientBalance {
                asset: asset.to_string(),
                needed: amount,
                available: entry.available,
            });
        }
        entry.available = sub(entry.available, amount, "available balance")?;
        self.supply.record_withdrawal(asset, amount)?;
        self.store(account, asset, entry);
        Ok(())
    }

    /// Set how much of `asset` the book may lock on the account's behalf.
    pub fn approve(&mut self, account: TraderId, asset: &str, amount: Decimal) {
        self.allowances.insert((account, asset.to_string()), amount);
    }

    #[must_use]
    pub fn allowance(&self, account: TraderId, asset: &str) -> Decimal {
        self.allowances
            .get(&(account, asset.to_string()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Sum of all accounts' balances (available + locked) for an asset.
    ///
    /// # Errors
    /// `ArithmeticOverflow` if the sum does not fit.
    pub fn total_supply(&self, asset: &str) -> Result<Decimal> {
        self.balances
            .iter()
            .filter(|((_, a), _)| a == asset)
            .try_fold(Decimal::ZERO, |sum, (_, entry)| {
                add(sum, entry.available, "total supply")
                    .and_then(|sum| add(sum, entry.locked, "total supply"))
            })
    }

    /// Check that trading has neither created nor destroyed `asset`.
    pub fn verify_supply(&self, asset: &str) -> Result<()> {
        self.supply.verify(asset, self.total_supply(asset)?)
    }
}

impl AssetLedger for InMemoryLedger {
    fn lock_funds(&mut self, account: TraderId, asset: &str, amount: Decimal) -> Result<()> {
        ensure_positive(amount, "Lock")?;

        let allowance = self.allowance(account, asset);
        if self.config.enforce_allowance && allowance < amount {
            return Err(SharebookError::InsufficientAllowance {
                asset: asset.to_string(),
                needed: amount,
                allowance,
            });
        }

        let mut entry = self.balance(account, asset);
        if entry.available < amount {
            return Err(SharebookError::InsufficientBalance {
                asset: asset.to_string(),
                needed: amount,
                available: entry.available,
            });
        }
        entry.available = sub(entry.available, amount, "available balance")?;
        entry.locked = add(entry.locked, amount, "locked balance")?;

        if self.config.enforce_allowance {
            let remaining = sub(allowance, amount, "allowance")?;
            self.allowances.insert((account, asset.to_string()), remaining);
        }
        self.store(account, asset, entry);
        Ok(())
    }

    fn release_funds(&mut self, account: TraderId, asset: &str, amount: Decimal) -> Result<()> {
        ensure_positive(amount, "Release")?;
        let mut entry = self.balance(account, asset);
        if entry.locked < amount {
            return Err(SharebookError::InsufficientLocked {
                asset: asset.to_string(),
                needed: amount,
                locked: entry.locked,
            });
        }
        entry.locked = sub(entry.locked, amount, "locked balance")?;
        entry.available = add(entry.available, amount, "available balance")?;
        self.store(account, asset, entry);
        Ok(())
    }

    fn transfer(
        &mut self,
        from: TraderId,
        to: TraderId,
        asset: &str,
        amount: Decimal,
    ) -> Result<()> {
        ensure_positive(amount, "Transfer")?;
        let mut src = self.balance(from, asset);
        if src.available < amount {
            return Err(SharebookError::InsufficientBalance {
                asset: asset.to_string(),
                needed: amount,
                available: src.available,
            });
        }
        if from == to {
            return Ok(());
        }
        src.available = sub(src.available, amount, "available balance")?;
        let mut dst = self.balance(to, asset);
        dst.available = add(dst.available, amount, "available balance")?;

        self.store(from, asset, src);
        self.store(to, asset, dst);
        Ok(())
    }

    fn balance(&self, account: TraderId, asset: &str) -> BalanceEntry {
        self.balances
            .get(&(account, asset.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot every entry the batch touches, apply, and restore the
    /// snapshot on the first failure. Restores allowances too, which the
    /// compensating default cannot.
    fn apply_batch(&mut self, ops: &[LedgerOp]) -> Result<()> {
        let mut touched: HashSet<Key> = HashSet::new();
        for op in ops {
            match op {
                LedgerOp::Lock { account, asset, .. } | LedgerOp::Release { account, asset, .. } => {
                    touched.insert((*account, asset.clone()));
                }
                LedgerOp::Transfer {
                    from, to, asset, ..
                } => {
                    touched.insert((*from, asset.clone()));
                    touched.insert((*to, asset.clone()));
                }
            }
        }

        let balances: Vec<(Key, Option<BalanceEntry>)> = touched
            .iter()
            .map(|key| (key.clone(), self.balances.get(key).cloned()))
            .collect();
        let allowances: Vec<(Key, Option<Decimal>)> = touched
            .iter()
            .map(|key| (key.clone(), self.allowances.get(key).copied()))
            .collect();

        for op in ops {
            if let Err(err) = self.apply(op) {
                for (key, entry) in balances {
                    match entry {
                        Some(entry) => self.balances.insert(key, entry),
                        None => self.balances.remove(&key),
                    };
                }
                for (key, allowance) in allowances {
                    match allowance {
                        Some(allowance) => self.allowances.insert(key, allowance),
                        None => self.allowances.remove(&key),
                    };
                }
                tracing::debug!(op = ?op, error = %err, "Ledger batch rolled back");
                return Err(err);
            }
        }
        Ok(())
    }
}
