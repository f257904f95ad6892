//! Inventory cache configuration.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults for development.

use std::time::Duration;

/// Configuration for the write-back inventory cache.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Quiet period after the last mutation before a pending flush fires.
    /// Must be larger than the typical inter-arrival time of a burst of
    /// requests for one product, and well below any consistency deadline
    /// the deployment promises.
    pub quiet_period: Duration,

    /// Optional ceiling on a single legacy-store call. `None` means wait
    /// as long as the store takes (its latency is large but bounded).
    pub store_timeout: Option<Duration>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_secs(5),
            store_timeout: None,
        }
    }
}

impl InventoryConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quiet period.
    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Set the store call timeout.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    /// Create an InventoryConfig from environment variables.
    ///
    /// Environment variables:
    /// - `KARDEX_QUIET_PERIOD_MS`: Debounce window in milliseconds (default: 5000)
    /// - `KARDEX_STORE_TIMEOUT_MS`: Per-call store timeout in milliseconds (default: none)
    pub fn from_env() -> Self {
        let quiet_period = std::env::var("KARDEX_QUIET_PERIOD_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(5));

        let store_timeout = std::env::var("KARDEX_STORE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis);

        Self {
            quiet_period,
            store_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = InventoryConfig::default();
        assert_eq!(config.quiet_period, Duration::from_secs(5));
        assert!(config.store_timeout.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = InventoryConfig::new()
            .with_quiet_period(Duration::from_millis(250))
            .with_store_timeout(Duration::from_secs(10));

        assert_eq!(config.quiet_period, Duration::from_millis(250));
        assert_eq!(config.store_timeout, Some(Duration::from_secs(10)));
    }
}
