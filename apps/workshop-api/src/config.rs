//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use workshop_core::WorkshopLimits;
use workshop_core::ports::LimitConfig;
use workshop_infra::DEFAULT_CALL_TIMEOUT;
#[cfg(feature = "redis")]
use workshop_infra::RedisConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "redis")]
    pub redis: RedisConfig,
    /// Namespace for counter keys in the shared store.
    pub rate_limit_key_prefix: String,
    /// Deadline for each counter store call.
    pub rate_limit_timeout: Duration,
    pub limits: WorkshopLimits,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    /// Missing or unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let limits = WorkshopLimits {
            posts: LimitConfig::new(
                parse_or(&lookup, "POSTS_LIMIT", 30),
                period_or(&lookup, "POSTS_PERIOD_SECS", 3600),
            ),
            comments: LimitConfig::new(
                parse_or(&lookup, "COMMENTS_LIMIT", 100),
                period_or(&lookup, "COMMENTS_PERIOD_SECS", 1800),
            ),
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080),
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_lookup(&lookup),
            rate_limit_key_prefix: lookup("RATE_LIMIT_KEY_PREFIX")
                .unwrap_or_else(|| "ws_limiter".to_string()),
            rate_limit_timeout: lookup("RATE_LIMIT_TIMEOUT_MS")
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_CALL_TIMEOUT),
            limits,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key).and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// A zero window would delete each counter as soon as it is created.
fn period_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default_secs: u64) -> Duration {
    match parse_or(lookup, key, default_secs) {
        0 => {
            tracing::warn!(
                key = %key,
                default_secs,
                "Zero rate limit period would disable enforcement, using default"
            );
            Duration::from_secs(default_secs)
        }
        secs => Duration::from_secs(secs),
    }
}
