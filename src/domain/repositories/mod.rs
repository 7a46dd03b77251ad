//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the document store. Implementations live in
//! `crate::infrastructure::persistence`.
//!
//! # Available Repositories
//!
//! - [`ShardRepository`] - Sharded per-domain label sets
//! - [`UniqueRepository`] - Uniqueness projections (TLDs, domains, hostnames, labels)
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod shard_repository;
pub mod unique_repository;

pub use shard_repository::{LabelUpsert, ShardRepository};
pub use unique_repository::UniqueRepository;

#[cfg(test)]
pub use unique_repository::MockUniqueRepository;
