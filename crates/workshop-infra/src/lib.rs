//! # Workshop Infrastructure
//!
//! Concrete implementations of the ports defined in `workshop-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `redis` - Redis-backed counter store for distributed rate limiting

pub mod rate_limit;
pub mod repository;

// Re-exports - In-Memory
pub use rate_limit::{CounterRateLimiter, DEFAULT_CALL_TIMEOUT, InMemoryCounterStore};
pub use repository::{InMemoryCommentRepository, InMemoryPostRepository};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use rate_limit::{RedisConfig, RedisCounterStore};
