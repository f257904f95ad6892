//! KARDEX Storage - Write-Back Stock Cache and Legacy Store Adapters
//!
//! This crate is the heart of KARDEX: an in-process write-back cache that
//! hides the multi-second latency of the legacy warehouse store while
//! guaranteeing that concurrent retrievals can never oversell a product.
//!
//! # Design
//!
//! - [`StockStore`] abstracts the legacy store: two slow operations, read
//!   quantity and overwrite quantity, each individually atomic.
//! - [`InventoryCache`] holds the authoritative in-process quantities and a
//!   per-product lock that serializes every read-modify-write. The same
//!   lock covers the load-on-miss path, so concurrent first touches of one
//!   product cause exactly one backend read.
//! - [`FlushScheduler`] debounces mutations: each successful adjustment
//!   (re)arms a per-product timer, and only after a quiet period does the
//!   latest cached value get written back, coalescing a burst of mutations
//!   into a single slow store write.
//! - [`InventoryService`] is the façade the request layer talks to.
//!
//! The cache is unconditionally authoritative once a product is loaded: the
//! flush path only ever *reads* cached values, so a slow or failing store
//! write can delay durability but never corrupt what clients observe.

pub mod cache;
pub mod file_store;
pub mod flush;
pub mod service;
pub mod store;

pub use cache::InventoryCache;
pub use file_store::FileStockStore;
pub use flush::FlushScheduler;
pub use service::InventoryService;
pub use store::{InMemoryStockStore, StockStore};
