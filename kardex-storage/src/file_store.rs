//! File-backed adapter for the legacy warehouse store.
//!
//! The legacy system persists one small JSON record per product. Only this
//! process may touch those files, which is what lets the in-process cache
//! be authoritative. Reads of a missing record yield 0, matching the
//! legacy behavior of "file absent means zero stock".

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use kardex_core::{ProductId, Quantity, StoreError};
use serde::{Deserialize, Serialize};

use crate::store::StockStore;

/// On-disk record for one product.
#[derive(Debug, Serialize, Deserialize)]
struct StockRecord {
    product_id: ProductId,
    quantity: Quantity,
}

/// Stock store backed by one JSON file per product.
///
/// An optional simulated latency reproduces the legacy system's fixed
/// per-operation delay for demos and end-to-end tests; production
/// deployments point this at the real (slow) storage mount and leave the
/// latency off.
#[derive(Debug, Clone)]
pub struct FileStockStore {
    dir: PathBuf,
    simulated_latency: Option<Duration>,
}

impl FileStockStore {
    /// Create a store rooted at `dir`. The directory is created on first
    /// write if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            simulated_latency: None,
        }
    }

    /// Add a fixed delay before every store call.
    pub fn with_simulated_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    fn stock_path(&self, product_id: ProductId) -> PathBuf {
        self.dir.join(format!("stock-{product_id}.json"))
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl StockStore for FileStockStore {
    async fn read_quantity(&self, product_id: ProductId) -> Result<Quantity, StoreError> {
        self.simulate_latency().await;
        let path = self.stock_path(product_id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(StoreError::read_failed(product_id, err.to_string())),
        };
        match serde_json::from_str::<StockRecord>(&raw) {
            Ok(record) => Ok(record.quantity),
            Err(err) => {
                // The legacy client tolerates malformed records and treats
                // them as empty stock; keep that behavior.
                tracing::warn!(product_id, %err, "malformed stock record, treating as zero");
                Ok(0)
            }
        }
    }

    async fn write_quantity(
        &self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<(), StoreError> {
        self.simulate_latency().await;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| StoreError::write_failed(product_id, err.to_string()))?;
        let record = StockRecord {
            product_id,
            quantity,
        };
        let raw = serde_json::to_string(&record)
            .map_err(|err| StoreError::write_failed(product_id, err.to_string()))?;
        tokio::fs::write(self.stock_path(product_id), raw)
            .await
            .map_err(|err| StoreError::write_failed(product_id, err.to_string()))
    }
}
