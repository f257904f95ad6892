//! KARDEX API - REST layer over the write-back inventory cache.
//!
//! Exposes the three legacy stock operations over HTTP while the storage
//! crate hides the slow warehouse store behind an in-process cache.

pub mod config;
pub mod error;
pub mod routes;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_router;
pub use types::{RestockRequest, RetrieveStockRequest, StockResponse};
