//! Token issuance, refresh, and verification.
//!
//! This module provides the token half of the grant model:
//!
//! - [`types`] - Request/response types for the token endpoint
//! - [`ledger`] - The token ledger (issue, look up, revoke)
//! - [`service`] - The grant flows behind `POST /token` and bearer
//!   verification
//!
//! # Example
//!
//! ```ignore
//! use tokensmith_auth::token::{TokenService, TokenRequest};
//!
//! let service = TokenService::new(codes, tokens, identity, config);
//!
//! let response = match request.grant_type.as_str() {
//!     "authorization_code" => service.exchange_code(&request, &client).await?,
//!     "refresh_token" => service.refresh(&request, &client).await?,
//!     "password" => service.password(&request, &client).await?,
//!     other => return Err(AuthError::unsupported_grant_type(other)),
//! };
//! ```

pub mod ledger;
pub mod service;
pub mod types;

// Ledger types
pub use ledger::{TokenLedger, TokenPair};

// Service types
pub use service::TokenService;

// Token endpoint types
pub use types::{TokenRequest, TokenResponse};
