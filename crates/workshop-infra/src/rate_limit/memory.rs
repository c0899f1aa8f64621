//! In-memory counter store - used as fallback when Redis is unavailable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::RwLock;
use tokio::time::Instant;

use workshop_core::ports::{CounterStore, RateLimitError};

/// Minimum spacing between full sweeps of expired counters.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct CounterEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CounterEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    fn ttl(&self, now: Instant) -> Option<Duration> {
        self.expires_at.map(|exp| exp.saturating_duration_since(now))
    }
}

/// In-memory counter store with Redis-like `INCR`/`TTL`/`EXPIRE` semantics.
///
/// Counters are per-process: instances behind a load balancer do not share
/// quota. Expiry follows the tokio clock, so tests can drive it with
/// `tokio::time::advance`. Expired counters are dropped when read and by a
/// periodic sweep on writes, so idle subjects do not accumulate.
#[derive(Default)]
pub struct InMemoryCounterStore {
    entries: RwLock<HashMap<String, CounterEntry>>,
    last_sweep: Mutex<Option<Instant>>,
    closed: AtomicBool,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value, replacing any existing entry.
    pub async fn insert(&self, key: &str, value: &str, ttl: Option<Duration>) {
        let expires_at = ttl.map(|d| Instant::now() + d);
        self.entries.write().await.insert(
            key.to_string(),
            CounterEntry {
                value: value.to_string(),
                expires_at,
            },
        );
    }

    /// Refuse every further operation, like a dropped connection.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn sweep_expired(&self, entries: &mut HashMap<String, CounterEntry>, now: Instant) {
        let mut last_sweep = self.last_sweep.lock();
        if last_sweep.is_some_and(|at| now.saturating_duration_since(at) < SWEEP_INTERVAL) {
            return;
        }
        *last_sweep = Some(now);

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = entries.len(), "Swept expired counters");
        }
    }

    fn ensure_open(&self) -> Result<(), RateLimitError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RateLimitError::Transport(
                "pipeline exec error: connection closed".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn get_with_ttl(
        &self,
        key: &str,
    ) -> Result<(Option<String>, Option<Duration>), RateLimitError> {
        self.ensure_open()?;

        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    return Ok((Some(entry.value.clone()), entry.ttl(now)));
                }
                Some(_) => {}
                None => return Ok((None, None)),
            }
        }

        // Clean up expired entry with write lock
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        Ok((None, None))
    }

    async fn incr_with_ttl(&self, key: &str) -> Result<(u64, Option<Duration>), RateLimitError> {
        self.ensure_open()?;

        let now = Instant::now();
        let mut entries = self.entries.write().await;
        self.sweep_expired(&mut entries, now);
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }

        let entry = entries.entry(key.to_string()).or_insert_with(|| CounterEntry {
            value: "0".to_string(),
            expires_at: None,
        });
        let current = entry
            .value
            .parse::<u64>()
            .ok()
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| {
                RateLimitError::Transport(
                    "pipeline exec error: value is not an integer or out of range".to_string(),
                )
            })?;
        entry.value = current.to_string();

        Ok((current, entry.ttl(now)))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), RateLimitError> {
        self.ensure_open()?;

        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(key) else {
            return Ok(());
        };

        // Non-positive expiry deletes the key, as Redis does.
        if entry.is_expired(now) || ttl.is_zero() {
            entries.remove(key);
        } else {
            entry.expires_at = Some(now + ttl);
        }
        Ok(())
    }
}
