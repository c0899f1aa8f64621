//! # Workshop Core
//!
//! The domain layer of the workshop backend.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the port traits infrastructure must implement, and the use cases
//! that gate post and comment creation behind per-user quotas.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::DomainError;
pub use service::{Workshop, WorkshopLimits};
