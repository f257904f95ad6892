//! KARDEX Core - Shared Types, Errors and Configuration
//!
//! Defines the vocabulary shared by the storage layer and the API layer:
//! product/quantity types, the error taxonomy, and the cache configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::InventoryConfig;
pub use error::{InventoryError, InventoryResult, StoreError, ValidationError};
pub use types::{ProductId, Quantity, StockLevel};
