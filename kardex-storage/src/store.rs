//! The legacy stock store abstraction.
//!
//! The warehouse system exposes exactly two operations, both slow and both
//! individually atomic. Everything KARDEX does is built on that narrow
//! contract; nothing here assumes the store can do more.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kardex_core::{ProductId, Quantity, StoreError};

/// The slow, authoritative key→quantity store.
///
/// Calls for different products may run concurrently without interference;
/// a single call for one product is the unit of atomicity. The last writer
/// for a product wins at the storage layer.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Read the persisted quantity for a product. A product the store has
    /// never seen reads as 0, not as an error.
    async fn read_quantity(&self, product_id: ProductId) -> Result<Quantity, StoreError>;

    /// Unconditionally overwrite the persisted quantity for a product.
    async fn write_quantity(
        &self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<(), StoreError>;
}

/// In-memory stock store for tests and local development.
///
/// Tracks how many reads and writes it has served, because the cache's
/// contracts (miss deduplication, flush coalescing) are stated in terms of
/// store operation counts. Optionally injects artificial latency to stand
/// in for the legacy system's multi-second calls, and can be switched into
/// a failing-writes mode to exercise the flush retry path.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    records: tokio::sync::RwLock<HashMap<ProductId, Quantity>>,
    reads: AtomicU64,
    writes: AtomicU64,
    latency: Option<Duration>,
    fail_writes: AtomicBool,
}

impl InMemoryStockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store whose every call sleeps for `latency` first.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Seed a persisted quantity directly, bypassing the counters.
    pub async fn seed(&self, product_id: ProductId, quantity: Quantity) {
        self.records.write().await.insert(product_id, quantity);
    }

    /// Read the persisted quantity directly, bypassing the counters.
    pub async fn persisted(&self, product_id: ProductId) -> Option<Quantity> {
        self.records.read().await.get(&product_id).copied()
    }

    /// Number of `read_quantity` calls served so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of successful `write_quantity` calls served so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn read_quantity(&self, product_id: ProductId) -> Result<Quantity, StoreError> {
        self.simulate_latency().await;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .read()
            .await
            .get(&product_id)
            .copied()
            .unwrap_or(0))
    }

    async fn write_quantity(
        &self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<(), StoreError> {
        self.simulate_latency().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::write_failed(product_id, "store unavailable"));
        }
        self.records.write().await.insert(product_id, quantity);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
