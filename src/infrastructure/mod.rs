//! Infrastructure layer for external integrations.
//!
//! Implements the storage contracts of the domain layer and the shard-count
//! hint cache.
//!
//! # Modules
//!
//! - [`cache`] - Shard-count hints (Redis and no-op implementations)
//! - [`persistence`] - PostgreSQL and in-memory repository implementations

pub mod cache;
pub mod persistence;
