//! # sharebook-types
//!
//! Shared types, errors, and configuration for the **ShareBook** order book.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`TraderId`], [`MarketPair`]
//! - **Order model**: [`Order`], [`OrderSide`], [`OrderStatus`]
//! - **Fill model**: [`Fill`]
//! - **Balance model**: [`BalanceEntry`], [`Asset`]
//! - **Statistics**: [`MarketStats`]
//! - **Configuration**: [`MarketConfig`], [`LedgerConfig`], [`SelfTradePolicy`]
//! - **Errors**: [`SharebookError`] with `SB_ERR_` prefix codes
//! - **Arithmetic**: [`exact_mul`] and [`bps_of_truncated`] for amounts that
//!   must not round
//! - **Constants**: fee denominator and defaults

pub mod amount;
pub mod balance;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod order;
pub mod stats;
pub mod trade;

pub use amount::{bps_of_truncated, exact_mul};
pub use balance::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use order::*;
pub use stats::*;
pub use trade::*;

// Constants are accessed via `sharebook_types::constants::FOO`.
