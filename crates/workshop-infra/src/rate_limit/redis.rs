//! Redis counter store - pipelined `GET`/`INCR` with `PTTL` read-back.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client};

use workshop_core::ports::{CounterStore, RateLimitError};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Deadline for each command or pipeline reply
    pub response_timeout: Duration,
    /// Whether to fallback to the in-memory store if Redis is unavailable
    pub fallback_to_memory: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(3),
            fallback_to_memory: true,
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            url: lookup("REDIS_URL").unwrap_or(defaults.url),
            connect_timeout: lookup("REDIS_CONNECT_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            response_timeout: lookup("REDIS_RESPONSE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.response_timeout),
            fallback_to_memory: lookup("REDIS_FALLBACK_TO_MEMORY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.fallback_to_memory),
        }
    }
}

/// Redis-backed counter store shared by every service instance.
///
/// Uses connection manager for automatic reconnection.
pub struct RedisCounterStore {
    conn: ConnectionManager,
}

impl RedisCounterStore {
    pub async fn new(config: &RedisConfig) -> Result<Self, RateLimitError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| RateLimitError::Transport(e.to_string()))?;

        let manager_config = ConnectionManagerConfig::new()
            .set_connection_timeout(config.connect_timeout)
            .set_response_timeout(config.response_timeout);

        // Use timeout to prevent hanging if Redis is unreachable
        let conn_manager_fut = ConnectionManager::new_with_config(client, manager_config);
        let conn = tokio::time::timeout(config.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| RateLimitError::Transport("Connection timed out".to_string()))?
            .map_err(|e| RateLimitError::Transport(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis counter store");

        Ok(Self { conn })
    }
}

/// Redis reports -2 for a missing key and -1 for a key without expiry.
fn ttl_from_millis(pttl: i64) -> Option<Duration> {
    u64::try_from(pttl)
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

fn pipeline_error(e: redis::RedisError) -> RateLimitError {
    RateLimitError::Transport(format!("pipeline exec error: {e}"))
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn get_with_ttl(
        &self,
        key: &str,
    ) -> Result<(Option<String>, Option<Duration>), RateLimitError> {
        let mut conn = self.conn.clone();

        let (value, pttl): (Option<String>, i64) = redis::pipe()
            .get(key)
            .pttl(key)
            .query_async(&mut conn)
            .await
            .map_err(pipeline_error)?;

        Ok((value, ttl_from_millis(pttl)))
    }

    async fn incr_with_ttl(&self, key: &str) -> Result<(u64, Option<Duration>), RateLimitError> {
        let mut conn = self.conn.clone();

        let (current, pttl): (i64, i64) = redis::pipe()
            .incr(key, 1)
            .pttl(key)
            .query_async(&mut conn)
            .await
            .map_err(pipeline_error)?;

        let current = u64::try_from(current).map_err(|_| {
            RateLimitError::Transport(format!("negative counter value {current} for {key}"))
        })?;

        Ok((current, ttl_from_millis(pttl)))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), RateLimitError> {
        let mut conn = self.conn.clone();
        let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);

        conn.pexpire::<_, ()>(key, millis)
            .await
            .map_err(|e| RateLimitError::Transport(format!("failed to set expire: {e}")))?;
        Ok(())
    }
}
