//! # sharebook-engine
//!
//! **Continuous limit order book for one share/stable market.**
//!
//! - [`OrderStore`]: append-only order records with dense sequential ids
//! - [`ActiveIndex`]: live bids and asks in price-time priority
//! - Matching: an incoming order trades at resting prices until it is
//!   filled or the best opposite price no longer crosses
//! - [`settlement`]: each fill releases, transfers and takes the protocol fee
//!   through the [`AssetLedger`](sharebook_ledger::AssetLedger)
//! - [`OrderBookEngine`]: the public facade; every submit and cancel is
//!   all-or-nothing across store, indexes, stats and ledger
//!
//! ## Flow
//!
//! ```text
//! submit ─► plan (validate, lock, walk opposite side, settle fills)
//!        ─► commit (ledger batch, then store/index/stats)
//! ```

pub mod active_index;
pub mod digest;
pub mod engine;
mod matcher;
pub mod order_store;
pub mod price_level;
pub mod settlement;
mod unit_of_work;

pub use active_index::ActiveIndex;
pub use digest::compute_state_digest;
pub use engine::{ExecutionReport, OrderBookEngine};
pub use order_store::OrderStore;
pub use price_level::PriceLevel;
