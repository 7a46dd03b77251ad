//! Repository implementations.
//!
//! # PostgreSQL
//!
//! - [`PgShardRepository`] - Shard documents with in-statement size cap checks
//! - [`PgUniqueRepository`] - Uniqueness projection tables
//!
//! # In-memory
//!
//! - [`MemoryShardRepository`] / [`MemoryUniqueRepository`] - Same semantics without a
//!   database; used by tests and `STORAGE_BACKEND=memory`

pub mod memory_shard_repository;
pub mod memory_unique_repository;
pub mod pg_shard_repository;
pub mod pg_unique_repository;

pub use memory_shard_repository::MemoryShardRepository;
pub use memory_unique_repository::MemoryUniqueRepository;
pub use pg_shard_repository::PgShardRepository;
pub use pg_unique_repository::PgUniqueRepository;
