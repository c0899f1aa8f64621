use std::time::Duration;

use async_trait::async_trait;

use super::RateLimitError;

/// Shared key-value counter store with atomic increment and key expiry.
///
/// A TTL of `None` means the key is absent or carries no expiry.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Read the raw value and remaining TTL of `key` in one round trip.
    async fn get_with_ttl(
        &self,
        key: &str,
    ) -> Result<(Option<String>, Option<Duration>), RateLimitError>;

    /// Increment `key` (creating it at 1) and read back its TTL in one round trip.
    async fn incr_with_ttl(&self, key: &str) -> Result<(u64, Option<Duration>), RateLimitError>;

    /// Set the expiry of `key`.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), RateLimitError>;
}
