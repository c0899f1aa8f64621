//! Rate limiting port.

use std::num::ParseIntError;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Quota policy for one group of actions.
///
/// A `limit` of zero disables enforcement for the group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitConfig {
    pub limit: u64,
    pub period: Duration,
}

impl LimitConfig {
    pub fn new(limit: u64, period: Duration) -> Self {
        Self { limit, period }
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit == 0
    }
}

/// Snapshot of a subject's quota as observed by [`RateLimiter::check`].
///
/// `current` may already be stale when the caller acts on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: u64,
    pub current: u64,
    pub remaining: u64,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitInfo {
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Rate limit errors.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// The counter store could not be reached or rejected the batch.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The stored counter is not a valid unsigned integer.
    #[error("Invalid counter value: {0}")]
    Parse(#[from] ParseIntError),
}

/// Per-group, per-subject admission control.
///
/// Callers `check` before the gated action, reject it when no quota is left,
/// and `trigger_increase` once the action has succeeded. The two calls are not
/// atomic, so concurrent requests for one subject may briefly over-admit.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Insert or replace the policy for `group_key`. Last write wins.
    fn register_group(&self, group_key: &str, cfg: LimitConfig);

    /// Report the remaining quota without consuming any.
    async fn check(&self, group_key: &str, subject_id: &str)
    -> Result<RateLimitInfo, RateLimitError>;

    /// Record one consumed unit of quota.
    async fn trigger_increase(&self, group_key: &str, subject_id: &str)
    -> Result<(), RateLimitError>;
}
