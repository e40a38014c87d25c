//! Common types used across the grant model.
//!
//! ## Domain Types
//!
//! - [`Client`] - OAuth 2.0 client registration
//! - [`GrantType`] - Supported OAuth grant types
//! - [`AuthorizationCode`] - Single-use authorization code
//! - [`AccessToken`] / [`RefreshToken`] - Opaque token records
//! - [`User`] - Resource owner as seen by the grant model

pub mod client;
pub mod code;
pub mod token;
pub mod user;

pub use client::{Client, ClientValidationError, GrantType};
pub use code::AuthorizationCode;
pub use token::{AccessToken, RefreshToken, generate_token, hash_token};
pub use user::{User, UserRole};
