//! In-process inventory cache with per-product mutation locking.
//!
//! The cache table is the single source of truth for a product's quantity
//! once that product has been loaded. All access to one product's entry
//! goes through that product's async mutex; the mutex covers both the
//! read-modify-write of `try_adjust` and the load-on-miss fetch, so two
//! concurrent first touches of a product produce exactly one store read
//! and two concurrent retrievals can never interleave their arithmetic.
//!
//! Entries are created lazily and never evicted; the product catalog is
//! small enough to stay resident for the process lifetime.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use kardex_core::{InventoryError, InventoryResult, ProductId, Quantity, StoreError};
use tokio::sync::{Mutex, RwLock};

use crate::store::StockStore;

/// One product's cached state. `None` means the product has not been
/// loaded from the store yet.
#[derive(Debug, Default)]
struct Slot {
    quantity: Option<Quantity>,
}

/// Write-back cache over a [`StockStore`].
///
/// Shared via `Arc`; the flush scheduler holds a second handle and only
/// ever reads through [`peek`](Self::peek).
#[derive(Debug)]
pub struct InventoryCache<S> {
    store: Arc<S>,
    store_timeout: Option<Duration>,
    /// productId → per-product slot. The outer lock is held only long
    /// enough to look up or insert a slot handle, never across store calls.
    slots: RwLock<HashMap<ProductId, Arc<Mutex<Slot>>>>,
}

impl<S: StockStore> InventoryCache<S> {
    /// Create a cache over the given store.
    pub fn new(store: Arc<S>, store_timeout: Option<Duration>) -> Self {
        Self {
            store,
            store_timeout,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Get a product's quantity, loading it from the store on first touch.
    ///
    /// A miss blocks only callers interested in this product; other
    /// products proceed in parallel. Concurrent misses for the same
    /// product wait on the product lock and observe the first caller's
    /// freshly loaded value instead of issuing their own store read.
    pub async fn get(&self, product_id: ProductId) -> Result<Quantity, StoreError> {
        let slot = self.slot(product_id).await;
        let mut slot = slot.lock().await;
        self.ensure_loaded(product_id, &mut slot).await
    }

    /// Atomically apply `delta` to a product's quantity.
    ///
    /// This is the sole gate that keeps quantities non-negative: if the
    /// result would be negative the adjustment fails with
    /// [`InventoryError::InsufficientStock`] and nothing changes. An
    /// adjustment past `i64::MAX` fails with
    /// [`InventoryError::QuantityOverflow`], likewise without mutating.
    /// A product never touched before is loaded first, under the same
    /// lock, so the arithmetic always starts from the store's value.
    pub async fn try_adjust(
        &self,
        product_id: ProductId,
        delta: Quantity,
    ) -> InventoryResult<Quantity> {
        let slot = self.slot(product_id).await;
        let mut slot = slot.lock().await;
        let current = self.ensure_loaded(product_id, &mut slot).await?;
        let next = current
            .checked_add(delta)
            .ok_or(InventoryError::QuantityOverflow {
                product_id,
                current,
                delta,
            })?;
        if next < 0 {
            return Err(InventoryError::InsufficientStock {
                product_id,
                requested: -delta,
                available: current,
            });
        }
        slot.quantity = Some(next);
        Ok(next)
    }

    /// Cache-only lookup, no store fallback. Used by the flush path, which
    /// must never turn into a read of the slow store.
    pub async fn peek(&self, product_id: ProductId) -> Option<Quantity> {
        let slot = {
            let slots = self.slots.read().await;
            slots.get(&product_id).cloned()
        }?;
        let slot = slot.lock().await;
        slot.quantity
    }

    /// Snapshot of every product that has a cache entry. Entries are never
    /// removed, so iterating this does not race with deletion.
    pub async fn loaded_products(&self) -> Vec<ProductId> {
        self.slots.read().await.keys().copied().collect()
    }

    /// Look up or create the slot handle for a product.
    async fn slot(&self, product_id: ProductId) -> Arc<Mutex<Slot>> {
        {
            let slots = self.slots.read().await;
            if let Some(slot) = slots.get(&product_id) {
                return Arc::clone(slot);
            }
        }
        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(product_id).or_default())
    }

    /// Load the slot from the store if it has no value yet. Caller holds
    /// the product lock. A failed load leaves the slot empty so the next
    /// caller retries the fetch.
    async fn ensure_loaded(
        &self,
        product_id: ProductId,
        slot: &mut Slot,
    ) -> Result<Quantity, StoreError> {
        if let Some(quantity) = slot.quantity {
            return Ok(quantity);
        }
        let quantity = self
            .with_timeout(product_id, self.store.read_quantity(product_id))
            .await?;
        tracing::debug!(product_id, quantity, "loaded stock from store");
        slot.quantity = Some(quantity);
        Ok(quantity)
    }

    async fn with_timeout<T>(
        &self,
        product_id: ProductId,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match self.store_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| StoreError::Timeout { product_id, limit })?,
            None => call.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStockStore;
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;

    fn cache_over(store: Arc<InMemoryStockStore>) -> InventoryCache<InMemoryStockStore> {
        InventoryCache::new(store, None)
    }

    #[tokio::test]
    async fn test_miss_then_hit_reads_store_once() {
        let store = Arc::new(InMemoryStockStore::new());
        store.seed(1, 10).await;
        let cache = cache_over(Arc::clone(&store));

        assert_eq!(cache.get(1).await.expect("get should succeed"), 10);
        assert_eq!(cache.get(1).await.expect("get should succeed"), 10);
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_deduplicate() {
        let store = Arc::new(InMemoryStockStore::with_latency(Duration::from_millis(50)));
        store.seed(1, 4).await;
        let cache = Arc::new(cache_over(Arc::clone(&store)));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            tasks.push(tokio::spawn(async move { cache.get(1).await }));
        }
        for task in tasks {
            let quantity = task
                .await
                .expect("task should not panic")
                .expect("get should succeed");
            assert_eq!(quantity, 4);
        }
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_product_is_zero() {
        let store = Arc::new(InMemoryStockStore::new());
        let cache = cache_over(store);
        assert_eq!(cache.get(42).await.expect("get should succeed"), 0);
    }

    #[tokio::test]
    async fn test_adjust_commits_and_rejects_oversell() {
        let store = Arc::new(InMemoryStockStore::new());
        store.seed(7, 3).await;
        let cache = cache_over(store);

        let err = cache
            .try_adjust(7, -5)
            .await
            .expect_err("oversell should be rejected");
        assert_eq!(
            err,
            InventoryError::InsufficientStock {
                product_id: 7,
                requested: 5,
                available: 3,
            }
        );
        // Failed adjust mutated nothing.
        assert_eq!(cache.peek(7).await, Some(3));

        assert_eq!(
            cache.try_adjust(7, -3).await.expect("adjust should succeed"),
            0
        );
        assert_eq!(
            cache.try_adjust(7, 10).await.expect("restock should succeed"),
            10
        );
    }

    #[tokio::test]
    async fn test_adjust_rejects_overflow() {
        let store = Arc::new(InMemoryStockStore::new());
        store.seed(1, i64::MAX - 1).await;
        let cache = cache_over(store);

        // Both amounts individually pass validation; the sum does not fit.
        assert_eq!(
            cache.try_adjust(1, 1).await.expect("adjust should succeed"),
            i64::MAX
        );
        let err = cache
            .try_adjust(1, 1)
            .await
            .expect_err("overflow should be rejected");
        assert_eq!(
            err,
            InventoryError::QuantityOverflow {
                product_id: 1,
                current: i64::MAX,
                delta: 1,
            }
        );
        // Failed adjust mutated nothing.
        assert_eq!(cache.peek(1).await, Some(i64::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_read_times_out() {
        let store = Arc::new(InMemoryStockStore::with_latency(Duration::from_secs(5)));
        store.seed(1, 6).await;
        let cache = InventoryCache::new(Arc::clone(&store), Some(Duration::from_secs(1)));

        let err = cache.get(1).await.expect_err("read should time out");
        assert_eq!(
            err,
            StoreError::Timeout {
                product_id: 1,
                limit: Duration::from_secs(1),
            }
        );
        // The slot stays unloaded, so a later call retries the store.
        assert_eq!(cache.peek(1).await, None);
    }

    #[tokio::test]
    async fn test_peek_does_not_populate() {
        let store = Arc::new(InMemoryStockStore::new());
        store.seed(2, 9).await;
        let cache = cache_over(Arc::clone(&store));

        assert_eq!(cache.peek(2).await, None);
        assert_eq!(store.read_count(), 0);
        assert!(cache.loaded_products().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_retrievals_never_oversell() {
        let store = Arc::new(InMemoryStockStore::new());
        store.seed(7, 10).await;
        let cache = Arc::new(cache_over(store));

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            tasks.push(tokio::spawn(async move { cache.try_adjust(7, -3).await }));
        }

        let mut successes = 0;
        for task in tasks {
            if task.await.expect("task should not panic").is_ok() {
                successes += 1;
            }
        }

        // 4 × 3 = 12 > 10, so exactly one retrieval must be rejected.
        assert_eq!(successes, 3);
        assert_eq!(cache.peek(7).await, Some(10 - 3 * successes));
    }

    proptest! {
        /// Any interleaving of adjustments keeps the quantity non-negative
        /// and equal to the sum of the applied deltas.
        #[test]
        fn prop_adjust_never_negative(
            initial in 0i64..100,
            deltas in prop::collection::vec(-30i64..30, 1..40),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .expect("runtime should build");
            rt.block_on(async {
                let store = Arc::new(InMemoryStockStore::new());
                store.seed(1, initial).await;
                let cache = cache_over(store);

                let mut expected = initial;
                for delta in deltas {
                    match cache.try_adjust(1, delta).await {
                        Ok(quantity) => {
                            expected += delta;
                            prop_assert_eq!(quantity, expected);
                        }
                        Err(InventoryError::InsufficientStock { available, .. }) => {
                            prop_assert!(delta < 0);
                            prop_assert_eq!(available, expected);
                        }
                        Err(err) => return Err(TestCaseError::fail(format!("{err}"))),
                    }
                    prop_assert!(expected >= 0);
                }
                prop_assert_eq!(cache.peek(1).await, Some(expected));
                Ok(())
            })?;
        }
    }
}
