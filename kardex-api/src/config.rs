//! API server configuration, loaded from environment variables with
//! development-friendly defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use kardex_core::InventoryConfig;

use crate::error::{ApiError, ApiResult};

/// Configuration for the KARDEX API server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind, e.g. "0.0.0.0".
    pub bind: String,
    /// Port to listen on, kept as a string until bind time so a bad value
    /// produces one clear error.
    pub port: String,
    /// Directory holding the legacy stock files.
    pub stock_dir: PathBuf,
    /// Optional artificial store latency, for demoing the legacy system's
    /// slowness locally.
    pub simulated_store_latency: Option<Duration>,
    /// Cache configuration (quiet period, store timeout).
    pub inventory: InventoryConfig,
}

impl ApiConfig {
    /// Create an ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `KARDEX_BIND`: Bind interface (default: "0.0.0.0")
    /// - `PORT` / `KARDEX_PORT`: Listen port (default: 3000)
    /// - `KARDEX_STOCK_DIR`: Legacy stock file directory (default: "./")
    /// - `KARDEX_STORE_LATENCY_MS`: Artificial store latency (default: none)
    /// - plus the `InventoryConfig` variables (quiet period, store timeout)
    pub fn from_env() -> Self {
        let bind = std::env::var("KARDEX_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("KARDEX_PORT").ok())
            .unwrap_or_else(|| "3000".to_string());
        let stock_dir = std::env::var("KARDEX_STOCK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./"));
        let simulated_store_latency = std::env::var("KARDEX_STORE_LATENCY_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis);

        Self {
            bind,
            port,
            stock_dir,
            simulated_store_latency,
            inventory: InventoryConfig::from_env(),
        }
    }

    /// Resolve the socket address to bind.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let port = self
            .port
            .parse::<u16>()
            .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", self.port)))?;
        let addr = format!("{}:{}", self.bind, port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }
}
