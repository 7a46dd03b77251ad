//! Core domain entities representing the storage data model.
//!
//! # Entity Types
//!
//! - [`HostnameParts`] - A hostname split into label, registrable name and suffix
//! - [`ShardDocument`] / [`ShardKey`] - One shard of a domain's label set
//! - [`UniqueKind`] - Selects one of the four uniqueness projections
//!
//! Entities are plain data. The serialized-size model used to decide when a
//! shard is full lives on [`ShardDocument`] so every store applies the same cap.

pub mod hostname;
pub mod shard;
pub mod unique;

pub use hostname::HostnameParts;
pub use shard::{ShardDocument, ShardKey};
pub use unique::UniqueKind;
