//! REST API layer for HTTP request/response handling.
//!
//! Translates HTTP requests into shard store operations and formats responses.
//! Authentication and rate limiting are expected in front of this service.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request tracing
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
