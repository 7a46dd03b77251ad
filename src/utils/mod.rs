//! Utility functions shared across layers.
//!
//! - [`hostname_normalizer`] - Hostname validation and decomposition against the public suffix list

pub mod hostname_normalizer;

pub use hostname_normalizer::normalize;
