//! Rate limiting implementations.
//!
//! [`CounterRateLimiter`] holds the group registry and the admission logic;
//! the counters themselves live in a [`CounterStore`](workshop_core::ports::CounterStore).

mod limiter;
mod memory;

pub use limiter::{CounterRateLimiter, DEFAULT_CALL_TIMEOUT};
pub use memory::InMemoryCounterStore;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisConfig, RedisCounterStore};
