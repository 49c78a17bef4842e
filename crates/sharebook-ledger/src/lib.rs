//! # sharebook-ledger
//!
//! The **Asset Ledger** collaborator: the sole authority on fund custody.
//!
//! The matching engine never touches balances directly. It describes every
//! movement as a [`LedgerOp`] and hands the whole unit of work to
//! [`AssetLedger::apply_batch`], which applies all of it or none of it.
//!
//! - [`AssetLedger`]: the `lock` / `release` / `transfer` capability
//! - [`InMemoryLedger`]: per-(account, asset) available/locked ledger with
//!   optional allowances
//! - [`SupplyConservation`]: deposits minus withdrawals must equal the sum of
//!   all balances, whatever trading happened in between
//!
//! ## Order Lifecycle
//!
//! ```text
//! deposit → lock_funds (order placed) → release_funds + transfer (fill)
//!                                     → release_funds (cancel)
//! ```

pub mod in_memory;
pub mod ledger;
pub mod supply_conservation;

pub use in_memory::InMemoryLedger;
pub use ledger::{AssetLedger, LedgerOp};
pub use supply_conservation::SupplyConservation;
