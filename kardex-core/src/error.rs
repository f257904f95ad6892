//! Error types for KARDEX operations

use crate::types::{ProductId, Quantity};
use std::time::Duration;
use thiserror::Error;

/// Errors from the slow legacy stock store.
///
/// These are durability-affecting on the write path (absorbed and retried
/// by the flush scheduler) and correctness-affecting on the cold read path
/// (surfaced to the caller, cache left unpopulated so the next call
/// retries).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Reading stock for product {product_id} failed: {reason}")]
    ReadFailed { product_id: ProductId, reason: String },

    #[error("Writing stock for product {product_id} failed: {reason}")]
    WriteFailed { product_id: ProductId, reason: String },

    #[error("Store call for product {product_id} timed out after {limit:?}")]
    Timeout { product_id: ProductId, limit: Duration },
}

impl StoreError {
    /// Create a ReadFailed error.
    pub fn read_failed(product_id: ProductId, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            product_id,
            reason: reason.into(),
        }
    }

    /// Create a WriteFailed error.
    pub fn write_failed(product_id: ProductId, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            product_id,
            reason: reason.into(),
        }
    }
}

/// Request validation errors, rejected before the cache is touched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Quantity },
}

/// Master error type for all KARDEX operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InventoryError {
    /// A retrieval asked for more than the cached quantity. No state was
    /// mutated; the caller decides whether to retry with a smaller amount.
    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: Quantity,
        available: Quantity,
    },

    /// An adjustment would push the quantity past the representable
    /// range. No state was mutated.
    #[error("Stock adjustment for product {product_id} overflows: {current} + {delta}")]
    QuantityOverflow {
        product_id: ProductId,
        current: Quantity,
        delta: Quantity,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for KARDEX operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display_read_failed() {
        let err = StoreError::read_failed(3, "disk on fire");
        let msg = format!("{}", err);
        assert!(msg.contains("product 3"));
        assert!(msg.contains("disk on fire"));
    }

    #[test]
    fn test_store_error_display_timeout() {
        let err = StoreError::Timeout {
            product_id: 9,
            limit: Duration::from_secs(4),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("timed out"));
        assert!(msg.contains("9"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::NonPositiveAmount { amount: -2 };
        let msg = format!("{}", err);
        assert!(msg.contains("positive"));
        assert!(msg.contains("-2"));
    }

    #[test]
    fn test_insufficient_stock_display() {
        let err = InventoryError::InsufficientStock {
            product_id: 7,
            requested: 5,
            available: 3,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("product 7"));
        assert!(msg.contains("requested 5"));
        assert!(msg.contains("available 3"));
    }

    #[test]
    fn test_quantity_overflow_display() {
        let err = InventoryError::QuantityOverflow {
            product_id: 2,
            current: i64::MAX,
            delta: 1,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("product 2"));
        assert!(msg.contains("overflows"));
    }

    #[test]
    fn test_inventory_error_from_variants() {
        let store = InventoryError::from(StoreError::write_failed(1, "io"));
        assert!(matches!(store, InventoryError::Store(_)));

        let validation = InventoryError::from(ValidationError::NonPositiveAmount { amount: 0 });
        assert!(matches!(validation, InventoryError::Validation(_)));
    }
}
