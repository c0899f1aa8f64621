//! Fixed-window counter limiter over a shared counter store.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use workshop_core::ports::{CounterStore, LimitConfig, RateLimitError, RateLimitInfo, RateLimiter};

/// Deadline applied to every store round trip unless overridden.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(3);

/// Rate limiter keeping one expiring counter per `(group, subject)` pair.
///
/// Counter keys have the form `<prefix>:<group>:<subject>`; colons inside the
/// subject are not escaped. The group registry is process-local, so every
/// instance sharing a store must register the same groups.
pub struct CounterRateLimiter {
    store: Arc<dyn CounterStore>,
    key_prefix: String,
    call_timeout: Duration,
    groups: RwLock<HashMap<String, LimitConfig>>,
}

impl CounterRateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, key_prefix: impl Into<String>) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Override the per-call store deadline.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Policy registered for `group_key`; unknown groups are unlimited.
    pub fn group_config(&self, group_key: &str) -> LimitConfig {
        self.groups
            .read()
            .get(group_key)
            .copied()
            .unwrap_or_default()
    }

    fn make_key(&self, group_key: &str, subject_id: &str) -> String {
        format!("{}:{}:{}", self.key_prefix, group_key, subject_id)
    }

    /// A store that stops answering fails the call instead of stalling it.
    async fn with_deadline<T>(
        &self,
        call: impl Future<Output = Result<T, RateLimitError>>,
    ) -> Result<T, RateLimitError> {
        tokio::time::timeout(self.call_timeout, call)
            .await
            .map_err(|_| RateLimitError::Transport("pipeline exec error: timed out".to_string()))?
    }
}

fn reset_at_after(ttl: Duration) -> DateTime<Utc> {
    let now = Utc::now();
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[async_trait]
impl RateLimiter for CounterRateLimiter {
    fn register_group(&self, group_key: &str, cfg: LimitConfig) {
        tracing::debug!(
            group = %group_key,
            limit = cfg.limit,
            period_secs = cfg.period.as_secs(),
            "Registered rate limit group"
        );
        self.groups.write().insert(group_key.to_string(), cfg);
    }

    async fn check(
        &self,
        group_key: &str,
        subject_id: &str,
    ) -> Result<RateLimitInfo, RateLimitError> {
        let cfg = self.group_config(group_key);
        if cfg.is_unlimited() {
            return Ok(RateLimitInfo {
                limit: 0,
                current: 0,
                remaining: 1,
                reset_at: reset_at_after(cfg.period),
            });
        }

        let key = self.make_key(group_key, subject_id);
        let (value, ttl) = self.with_deadline(self.store.get_with_ttl(&key)).await?;

        let current = match value {
            Some(raw) => raw.parse::<u64>()?,
            None => 0,
        };
        let ttl = ttl.filter(|ttl| !ttl.is_zero()).unwrap_or(cfg.period);

        tracing::debug!(key = %key, current, limit = cfg.limit, "Checked rate limit");

        Ok(RateLimitInfo {
            limit: cfg.limit,
            current,
            remaining: cfg.limit.saturating_sub(current),
            reset_at: reset_at_after(ttl),
        })
    }

    async fn trigger_increase(
        &self,
        group_key: &str,
        subject_id: &str,
    ) -> Result<(), RateLimitError> {
        let cfg = self.group_config(group_key);
        if cfg.is_unlimited() {
            return Ok(());
        }

        let key = self.make_key(group_key, subject_id);
        let (current, ttl) = self.with_deadline(self.store.incr_with_ttl(&key)).await?;

        // Racing first writers may both land here; they set the same period.
        if current == 1 && ttl.is_none() {
            self.with_deadline(self.store.expire(&key, cfg.period)).await?;
        }

        tracing::debug!(key = %key, current, "Increased rate limit counter");

        Ok(())
    }
}
