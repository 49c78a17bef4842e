//! Error types for the ShareBook engine.
//!
//! All errors use the `SB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order errors (validation, authorization, state)
//! - 2xx: Ledger / balance errors
//! - 3xx: Matching errors
//! - 4xx: Arithmetic errors
//! - 9xx: Configuration / general errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{Asset, OrderId, TraderId};

/// Central error enum for all ShareBook operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SharebookError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// The order id was never issued by the order store.
    #[error("SB_ERR_100: Order not found: {0}")]
    NotFound(OrderId),

    /// The submission failed validation (zero amount, zero price, bad precision).
    #[error("SB_ERR_101: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// The caller does not own the order it tried to act on.
    #[error("SB_ERR_102: Trader {caller} is not the owner of order {order_id}")]
    Unauthorized { order_id: OrderId, caller: TraderId },

    /// The order already reached a terminal state (filled or cancelled).
    #[error("SB_ERR_103: Order already inactive: {0}")]
    AlreadyInactive(OrderId),

    // =================================================================
    // Ledger Errors (2xx)
    // =================================================================
    /// Not enough available balance to lock or transfer.
    #[error("SB_ERR_200: Insufficient {asset} balance: need {needed}, have {available}")]
    InsufficientBalance {
        asset: Asset,
        needed: Decimal,
        available: Decimal,
    },

    /// The account has not approved enough of the asset for the book.
    #[error("SB_ERR_201: Insufficient {asset} allowance: need {needed}, approved {allowance}")]
    InsufficientAllowance {
        asset: Asset,
        needed: Decimal,
        allowance: Decimal,
    },

    /// Not enough locked balance to release.
    #[error("SB_ERR_202: Insufficient locked {asset}: need {needed}, locked {locked}")]
    InsufficientLocked {
        asset: Asset,
        needed: Decimal,
        locked: Decimal,
    },

    /// A ledger amount was zero or negative.
    #[error("SB_ERR_203: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Supply conservation invariant violated.
    #[error("SB_ERR_204: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    /// The ledger's locked balance disagrees with the book's active orders.
    #[error("SB_ERR_205: Collateral mismatch for {trader} in {asset}: orders need {expected}, ledger holds {locked}")]
    CollateralMismatch {
        trader: TraderId,
        asset: Asset,
        expected: Decimal,
        locked: Decimal,
    },

    // =================================================================
    // Matching Errors (3xx)
    // =================================================================
    /// The submission would have matched the trader's own resting order.
    #[error("SB_ERR_300: Self-trade not allowed: trader {trader} owns resting order {resting_order}")]
    SelfTradeNotAllowed {
        trader: TraderId,
        resting_order: OrderId,
    },

    // =================================================================
    // Arithmetic Errors (4xx)
    // =================================================================
    /// Fixed-point arithmetic overflowed.
    #[error("SB_ERR_400: Arithmetic overflow computing {context}")]
    ArithmeticOverflow { context: String },

    // =================================================================
    // Configuration / General (9xx)
    // =================================================================
    /// Configuration error (invalid fee rate, precision, etc.).
    #[error("SB_ERR_900: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("SB_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

impl SharebookError {
    /// Shorthand for an [`SharebookError::ArithmeticOverflow`].
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::ArithmeticOverflow {
            context: context.into(),
        }
    }

    /// Shorthand for an [`SharebookError::InvalidOrder`].
    pub fn invalid_order(reason: impl Into<String>) -> Self {
        Self::InvalidOrder {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SharebookError>;

impl From<serde_json::Error> for SharebookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = SharebookError::NotFound(OrderId(7));
        let msg = format!("{err}");
        assert!(msg.starts_with("SB_ERR_100"), "Got: {msg}");
        assert!(msg.contains("#7"));
    }

    #[test]
    fn insufficient_balance_display() {
        let err = SharebookError::InsufficientBalance {
            asset: "USDC".into(),
            needed: Decimal::new(100, 0),
            available: Decimal::new(50, 0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("SB_ERR_200"));
        assert!(msg.contains("USDC"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn all_errors_have_sb_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(SharebookError::AlreadyInactive(OrderId(1))),
            Box::new(SharebookError::invalid_order("zero price")),
            Box::new(SharebookError::overflow("quote amount")),
            Box::new(SharebookError::Configuration("bad".into())),
            Box::new(SharebookError::Unauthorized {
                order_id: OrderId(1),
                caller: TraderId::from_bytes([1; 16]),
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("SB_ERR_"),
                "Error missing SB_ERR_ prefix: {msg}"
            );
        }
    }
}
