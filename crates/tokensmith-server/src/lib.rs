//! Tokensmith HTTP server.
//!
//! Glue between the protocol core in `tokensmith-auth` and the outside
//! world: configuration loading, tracing setup, the PostgreSQL pool and
//! the axum router that exposes the three OAuth endpoints.

pub mod config;
pub mod observability;
pub mod pool;
pub mod router;

pub use config::AppConfig;
