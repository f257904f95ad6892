//! Core data types for product stock.

use serde::{Deserialize, Serialize};

/// Identifier of a product in the legacy warehouse system.
///
/// The legacy system keys everything by a small positive integer, so no
/// richer identity type is warranted.
pub type ProductId = u32;

/// A stock quantity.
///
/// Signed so that adjustment arithmetic (`current + delta`) stays in one
/// domain; the non-negative invariant is enforced at the single mutation
/// gate (`InventoryCache::try_adjust`), never by the type itself.
pub type Quantity = i64;

/// A product together with its current stock quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    /// The product this level belongs to.
    pub product_id: ProductId,
    /// Current quantity. Never negative once it has passed `try_adjust`.
    pub quantity: Quantity,
}

impl StockLevel {
    /// Create a new stock level.
    pub fn new(product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}
