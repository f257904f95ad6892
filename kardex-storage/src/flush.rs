//! Debounced write-back flushing.
//!
//! Every committed mutation arms a per-product timer. While requests keep
//! arriving faster than the quiet period the timer keeps being replaced,
//! so a burst of N mutations reaches the slow store as a single write
//! carrying the value current at fire time. The flush path only reads the
//! cache; all cache writes stay behind the per-product lock in
//! [`InventoryCache`].
//!
//! A failed store write is never surfaced to a request. The product is
//! re-armed and retried after another quiet period; until then the cached
//! value remains authoritative and only durability lags.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use kardex_core::{InventoryConfig, ProductId, Quantity, StoreError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::cache::InventoryCache;
use crate::store::StockStore;

/// A scheduled flush for one product. At most one exists per product; the
/// generation lets a superseded timer detect it lost the race even if its
/// abort arrived late.
#[derive(Debug)]
struct PendingFlush {
    generation: u64,
    timer: JoinHandle<()>,
}

#[derive(Debug)]
struct FlushInner<S> {
    cache: Arc<InventoryCache<S>>,
    store: Arc<S>,
    quiet_period: Duration,
    store_timeout: Option<Duration>,
    /// productId → the one live scheduled flush.
    pending: Mutex<HashMap<ProductId, PendingFlush>>,
    /// productId → lock serializing store writes for that product, so a
    /// slow in-flight flush can never run concurrently with its successor.
    write_locks: Mutex<HashMap<ProductId, Arc<Mutex<()>>>>,
}

/// Per-product debounce scheduler over a [`StockStore`].
///
/// Cheap to clone; all clones share the same pending-flush table.
#[derive(Debug)]
pub struct FlushScheduler<S> {
    inner: Arc<FlushInner<S>>,
}

impl<S> Clone for FlushScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: StockStore + 'static> FlushScheduler<S> {
    /// Create a scheduler flushing `cache` values into `store`.
    pub fn new(cache: Arc<InventoryCache<S>>, store: Arc<S>, config: &InventoryConfig) -> Self {
        Self {
            inner: Arc::new(FlushInner {
                cache,
                store,
                quiet_period: config.quiet_period,
                store_timeout: config.store_timeout,
                pending: Mutex::new(HashMap::new()),
                write_locks: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Schedule a flush for `product_id` after the quiet period, replacing
    /// any flush already pending for it.
    pub async fn arm(&self, product_id: ProductId) {
        let mut pending = self.inner.pending.lock().await;
        let generation = pending
            .get(&product_id)
            .map(|p| p.generation)
            .unwrap_or(0)
            + 1;

        let timer = tokio::spawn(timer_task(self.clone(), product_id, generation));

        if let Some(replaced) = pending.insert(product_id, PendingFlush { generation, timer }) {
            replaced.timer.abort();
        }
    }

    /// Flush a product immediately, bypassing the debounce window. Used by
    /// [`drain`](Self::drain); a product with no cached value is a no-op.
    pub async fn flush_now(&self, product_id: ProductId) -> Result<(), StoreError> {
        {
            let mut pending = self.inner.pending.lock().await;
            if let Some(cancelled) = pending.remove(&product_id) {
                cancelled.timer.abort();
            }
        }
        let Some(quantity) = self.inner.cache.peek(product_id).await else {
            return Ok(());
        };
        self.write(product_id, quantity).await
    }

    /// Flush every product with a pending timer, returning how many were
    /// written. Called on shutdown so committed mutations that have not
    /// reached the store yet are not lost. Failures are logged and skipped;
    /// at this point nobody can do better than the operator reading the log.
    pub async fn drain(&self) -> usize {
        let dirty: Vec<ProductId> = self.inner.pending.lock().await.keys().copied().collect();
        let mut flushed = 0;
        for product_id in dirty {
            match self.flush_now(product_id).await {
                Ok(()) => flushed += 1,
                Err(err) => {
                    tracing::error!(product_id, %err, "drain flush failed, update not persisted");
                }
            }
        }
        flushed
    }

    /// Number of products with a flush currently pending.
    pub async fn pending_count(&self) -> usize {
        self.inner.pending.lock().await.len()
    }

    /// Timer callback: write the product's current cached value if this
    /// timer is still the live one.
    async fn fire(&self, product_id: ProductId, generation: u64) {
        if self.superseded(product_id, generation).await {
            return;
        }

        let Some(quantity) = self.inner.cache.peek(product_id).await else {
            // Armed product without cached state; nothing to persist.
            self.clear(product_id, generation).await;
            return;
        };

        match self.write(product_id, quantity).await {
            Ok(()) => {
                tracing::debug!(product_id, quantity, "flushed stock to store");
                self.clear(product_id, generation).await;
            }
            Err(err) => {
                tracing::warn!(product_id, %err, "stock flush failed, re-arming for retry");
                // A newer arm owns the retry if it raised the generation.
                if !self.superseded(product_id, generation).await {
                    self.arm(product_id).await;
                }
            }
        }
    }

    /// Whether a newer flush has been armed (or the entry cancelled) since
    /// `generation` was issued.
    async fn superseded(&self, product_id: ProductId, generation: u64) -> bool {
        let pending = self.inner.pending.lock().await;
        pending.get(&product_id).map(|p| p.generation) != Some(generation)
    }

    /// Remove the pending entry if it still belongs to `generation`.
    async fn clear(&self, product_id: ProductId, generation: u64) {
        let mut pending = self.inner.pending.lock().await;
        if pending.get(&product_id).map(|p| p.generation) == Some(generation) {
            pending.remove(&product_id);
        }
    }

    /// Write one product's value under its write lock, with the optional
    /// store-call timeout applied.
    async fn write(&self, product_id: ProductId, quantity: Quantity) -> Result<(), StoreError> {
        let write_lock = {
            let mut locks = self.inner.write_locks.lock().await;
            Arc::clone(locks.entry(product_id).or_default())
        };
        let _guard = write_lock.lock().await;

        let call = self.inner.store.write_quantity(product_id, quantity);
        match self.inner.store_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| StoreError::Timeout { product_id, limit })?,
            None => call.await,
        }
    }
}

/// Sleep-then-fire task for one armed flush. Returned boxed: `fire`'s
/// retry branch awaits `arm`, so an unboxed future here would contain its
/// own type recursively and could not be spawned.
fn timer_task<S: StockStore + 'static>(
    scheduler: FlushScheduler<S>,
    product_id: ProductId,
    generation: u64,
) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async move {
        tokio::time::sleep(scheduler.inner.quiet_period).await;
        scheduler.fire(product_id, generation).await;
    })
}
