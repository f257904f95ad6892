//! Operation-level façade over the cache and the flush scheduler.
//!
//! The request layer only ever talks to [`InventoryService`]. Validation
//! happens here, before the cache is touched; a rejected request arms no
//! flush because nothing changed.

use std::sync::Arc;

use kardex_core::{InventoryConfig, InventoryResult, ProductId, Quantity, ValidationError};

use crate::cache::InventoryCache;
use crate::flush::FlushScheduler;
use crate::store::StockStore;

/// The inventory operations exposed to the request layer.
///
/// Cheap to clone; clones share one cache and one scheduler.
#[derive(Debug)]
pub struct InventoryService<S> {
    cache: Arc<InventoryCache<S>>,
    scheduler: FlushScheduler<S>,
}

impl<S> Clone for InventoryService<S> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<S: StockStore + 'static> InventoryService<S> {
    /// Build the service over a store, wiring cache and scheduler together.
    pub fn new(store: Arc<S>, config: InventoryConfig) -> Self {
        let cache = Arc::new(InventoryCache::new(
            Arc::clone(&store),
            config.store_timeout,
        ));
        let scheduler = FlushScheduler::new(Arc::clone(&cache), store, &config);
        Self { cache, scheduler }
    }

    /// Current quantity for a product. Populates the cache on first touch;
    /// no flush is armed since nothing was mutated.
    pub async fn get_stock(&self, product_id: ProductId) -> InventoryResult<Quantity> {
        Ok(self.cache.get(product_id).await?)
    }

    /// Take `amount` units out of stock. Fails with InsufficientStock if
    /// the product holds less than `amount`, mutating nothing and arming
    /// no flush. On success returns the remaining quantity.
    pub async fn retrieve(
        &self,
        product_id: ProductId,
        amount: Quantity,
    ) -> InventoryResult<Quantity> {
        ensure_positive(amount)?;
        let remaining = self.cache.try_adjust(product_id, -amount).await?;
        self.scheduler.arm(product_id).await;
        tracing::debug!(product_id, amount, remaining, "stock retrieved");
        Ok(remaining)
    }

    /// Add `amount` units to stock, returning the new quantity.
    pub async fn restock(
        &self,
        product_id: ProductId,
        amount: Quantity,
    ) -> InventoryResult<Quantity> {
        ensure_positive(amount)?;
        let quantity = self.cache.try_adjust(product_id, amount).await?;
        self.scheduler.arm(product_id).await;
        tracing::debug!(product_id, amount, quantity, "stock replenished");
        Ok(quantity)
    }

    /// Flush every dirty product immediately. Call before process exit so
    /// no committed mutation is left unpersisted. Returns the number of
    /// products written.
    pub async fn drain(&self) -> usize {
        self.scheduler.drain().await
    }
}

fn ensure_positive(amount: Quantity) -> Result<(), ValidationError> {
    if amount <= 0 {
        return Err(ValidationError::NonPositiveAmount { amount });
    }
    Ok(())
}
