//! Configuration types for a ShareBook market and its ledger.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MarketPair, Result, SharebookError, TraderId, constants};

/// What to do when an incoming order would match the submitter's own
/// resting order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfTradePolicy {
    /// Fail the whole submission with `SelfTradeNotAllowed`.
    #[default]
    Reject,
    /// Pass over own resting orders and keep matching behind them.
    Skip,
}

/// Per-market configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Base (share) and quote (stable) asset symbols.
    pub market: MarketPair,
    /// Decimal places allowed in base amounts.
    pub base_decimals: u32,
    /// Decimal places allowed in prices and quote amounts.
    pub quote_decimals: u32,
    /// Protocol fee on each fill's quote amount, in basis points.
    pub fee_rate_bps: u32,
    /// Account credited with protocol fees.
    pub fee_recipient: TraderId,
    pub self_trade_policy: SelfTradePolicy,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            market: MarketPair::new(constants::DEFAULT_BASE_ASSET, constants::DEFAULT_QUOTE_ASSET),
            base_decimals: constants::DEFAULT_BASE_DECIMALS,
            quote_decimals: constants::DEFAULT_QUOTE_DECIMALS,
            fee_rate_bps: constants::DEFAULT_FEE_RATE_BPS,
            fee_recipient: TraderId(Uuid::nil()),
            self_trade_policy: SelfTradePolicy::default(),
        }
    }
}

impl MarketConfig {
    /// Parse and validate a JSON market config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.market.base.is_empty() || self.market.quote.is_empty() {
            return Err(SharebookError::Configuration(
                "asset symbols must be non-empty".into(),
            ));
        }
        if self.market.base == self.market.quote {
            return Err(SharebookError::Configuration(format!(
                "base and quote must differ, both are {}",
                self.market.base
            )));
        }
        if self.fee_rate_bps > constants::BPS_DENOMINATOR {
            return Err(SharebookError::Configuration(format!(
                "fee rate {} bps exceeds {}",
                self.fee_rate_bps,
                constants::BPS_DENOMINATOR
            )));
        }
        for (name, decimals) in [
            ("base_decimals", self.base_decimals),
            ("quote_decimals", self.quote_decimals),
        ] {
            if decimals > constants::MAX_DECIMALS {
                return Err(SharebookError::Configuration(format!(
                    "{name} {decimals} exceeds {}",
                    constants::MAX_DECIMALS
                )));
            }
        }
        // Notional `amount * price` needs both precisions at once.
        if self.base_decimals + self.quote_decimals > constants::MAX_DECIMALS {
            return Err(SharebookError::Configuration(format!(
                "base_decimals + quote_decimals exceeds {}",
                constants::MAX_DECIMALS
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn symbol(&self) -> String {
        self.market.symbol()
    }
}

/// Configuration of the in-memory asset ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Require an explicit `approve` before funds can be locked.
    pub enforce_allowance: bool,
}
