//! Application layer services implementing the registry's business logic.
//!
//! Services consume repository traits and are shared between the HTTP handlers,
//! the background projection worker and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::shard_service::ShardService`] - Sharded insert, lookup and TLD lookup
//! - [`services::projector_service::ProjectorService`] - Uniqueness projections
//! - [`services::stats_service::StatsService`] - Aggregate counts

pub mod services;
