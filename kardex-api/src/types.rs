//! Request and response DTOs for the stock endpoints.
//!
//! Wire names are camelCase, matching what the legacy desktop client
//! already sends.

use kardex_core::{ProductId, Quantity};
use serde::{Deserialize, Serialize};

/// Body of `POST /stock/retrieve`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveStockRequest {
    pub product_id: ProductId,
    pub amount: Quantity,
}

/// Body of `POST /stock/restock`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockRequest {
    pub product_id: ProductId,
    pub amount: Quantity,
}

/// A product's current stock, as returned by reads and restocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockResponse {
    pub product_id: ProductId,
    pub quantity: Quantity,
}
