//! System-wide constants for the ShareBook engine.

/// Denominator for fee rates expressed in basis points.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Decimal places of one basis point (1 bp = 0.0001).
pub const BPS_SCALE: u32 = 4;

/// Default protocol fee rate in basis points (0.30%).
pub const DEFAULT_FEE_RATE_BPS: u32 = 30;

/// Default decimal precision of the base (share) asset.
pub const DEFAULT_BASE_DECIMALS: u32 = 8;

/// Default decimal precision of the quote (stable) asset.
pub const DEFAULT_QUOTE_DECIMALS: u32 = 6;

/// Largest precision `rust_decimal` can represent.
pub const MAX_DECIMALS: u32 = 28;

/// Default base asset symbol.
pub const DEFAULT_BASE_ASSET: &str = "SHARE";

/// Default quote asset symbol.
pub const DEFAULT_QUOTE_ASSET: &str = "USDC";

/// First order id handed out by a fresh order store.
pub const FIRST_ORDER_ID: u64 = 1;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "ShareBook";
