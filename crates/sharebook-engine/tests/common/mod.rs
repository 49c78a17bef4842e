//! Shared harness for the engine integration tests.

#![allow(dead_code)]

use rust_decimal::Decimal;
use sharebook_engine::OrderBookEngine;
use sharebook_ledger::{AssetLedger, InMemoryLedger};
use sharebook_types::{MarketConfig, TraderId};
use tracing_subscriber::EnvFilter;

pub const BASE: &str = "SHARE";
pub const QUOTE: &str = "USDC";

pub fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

/// `mantissa * 10^-scale`, e.g. `decs(25, 1)` is 2.5.
pub fn decs(mantissa: i64, scale: u32) -> Decimal {
    Decimal::new(mantissa, scale)
}

/// Route engine events to the test output; `RUST_LOG=debug` shows fills.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fee-free market so balances in scenarios stay round.
pub fn zero_fee_config() -> MarketConfig {
    MarketConfig {
        fee_rate_bps: 0,
        fee_recipient: TraderId::from_bytes([0xfe; 16]),
        ..MarketConfig::default()
    }
}

pub fn engine(config: MarketConfig) -> OrderBookEngine {
    init_tracing();
    OrderBookEngine::new(config, InMemoryLedger::new()).unwrap()
}

/// Give `trader` `base` shares and `quote` stable units.
pub fn fund(engine: &mut OrderBookEngine, trader: TraderId, base: i64, quote: i64) {
    let ledger = engine.ledger_mut();
    if base > 0 {
        ledger.deposit(trader, BASE, dec(base)).unwrap();
    }
    if quote > 0 {
        ledger.deposit(trader, QUOTE, dec(quote)).unwrap();
    }
}

pub fn available(engine: &OrderBookEngine, trader: TraderId, asset: &str) -> Decimal {
    engine.ledger().balance(trader, asset).available
}

pub fn locked(engine: &OrderBookEngine, trader: TraderId, asset: &str) -> Decimal {
    engine.ledger().balance(trader, asset).locked
}

/// Supply and collateral checks that must hold after every operation.
pub fn assert_books_balance(engine: &OrderBookEngine) {
    engine.ledger().verify_supply(BASE).unwrap();
    engine.ledger().verify_supply(QUOTE).unwrap();
    engine.verify_collateral().unwrap();
}
