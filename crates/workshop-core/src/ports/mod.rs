//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod counter_store;
mod rate_limit;
mod repository;

pub use counter_store::CounterStore;
pub use rate_limit::{LimitConfig, RateLimitError, RateLimitInfo, RateLimiter};
pub use repository::{CommentRepository, PostRepository};
