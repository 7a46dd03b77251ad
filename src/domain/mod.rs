//! Domain layer: entities, repository contracts and background work.
//!
//! # Architecture
//!
//! - [`entities`] - Hostname parts, shard documents and projection kinds
//! - [`repositories`] - Storage trait definitions
//! - [`projection_worker`] - Periodic uniqueness projection
//!
//! Repository traits are implemented in `crate::infrastructure::persistence`;
//! business logic lives in [`crate::application::services`].

pub mod entities;
pub mod projection_worker;
pub mod repositories;
