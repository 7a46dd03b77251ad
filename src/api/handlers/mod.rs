//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod insert;
pub mod lookup;
pub mod stats;
pub mod tld;

pub use health::health_handler;
pub use insert::{batch_insert_handler, insert_handler};
pub use lookup::lookup_handler;
pub use stats::stats_handler;
pub use tld::tld_handler;
