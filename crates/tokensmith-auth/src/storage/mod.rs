//! Storage traits for grant-model data.
//!
//! This module defines storage interfaces for:
//!
//! - OAuth client registrations
//! - Single-use authorization codes
//! - Access and refresh tokens
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `tokensmith-auth-postgres` - PostgreSQL storage backend

pub mod client;
pub mod code;
pub mod token;

pub use client::ClientStorage;
pub use code::AuthorizationCodeStorage;
pub use token::{AccessTokenStorage, RefreshTokenStorage};
