//! Application state - shared across all handlers.

use std::sync::Arc;

use workshop_core::Workshop;
use workshop_core::ports::{CounterStore, RateLimitError};
use workshop_infra::{
    CounterRateLimiter, InMemoryCommentRepository, InMemoryCounterStore, InMemoryPostRepository,
};
#[cfg(feature = "redis")]
use workshop_infra::RedisCounterStore;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub workshop: Arc<Workshop>,
}

impl AppState {
    /// Build the application state, connecting to the counter store.
    pub async fn new(config: &AppConfig) -> Result<Self, RateLimitError> {
        let store = build_counter_store(config).await?;
        let state = Self::with_store(store, config);

        tracing::info!("Application state initialized");

        Ok(state)
    }

    /// Wire the limiter and use cases over an already-built counter store.
    pub fn with_store(store: Arc<dyn CounterStore>, config: &AppConfig) -> Self {
        let limiter = Arc::new(
            CounterRateLimiter::new(store, config.rate_limit_key_prefix.clone())
                .with_call_timeout(config.rate_limit_timeout),
        );

        let workshop = Workshop::new(
            config.limits,
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryCommentRepository::new()),
            limiter,
        );

        Self {
            workshop: Arc::new(workshop),
        }
    }
}

#[cfg(feature = "redis")]
async fn build_counter_store(
    config: &AppConfig,
) -> Result<Arc<dyn CounterStore>, RateLimitError> {
    match RedisCounterStore::new(&config.redis).await {
        Ok(store) => Ok(Arc::new(store)),
        Err(e) if config.redis.fallback_to_memory => {
            tracing::warn!(
                error = %e,
                "Redis unavailable. Rate limits fall back to per-process counters."
            );
            Ok(Arc::new(InMemoryCounterStore::new()))
        }
        Err(e) => Err(e),
    }
}

#[cfg(not(feature = "redis"))]
async fn build_counter_store(
    _config: &AppConfig,
) -> Result<Arc<dyn CounterStore>, RateLimitError> {
    tracing::info!("Running without redis feature - using in-memory counter store");
    Ok(Arc::new(InMemoryCounterStore::new()))
}
