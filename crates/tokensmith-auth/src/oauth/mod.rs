//! OAuth 2.0 authorization code flow.
//!
//! This module provides the authorization half of the grant model:
//!
//! - Authorization endpoint request/response types
//! - Client authentication for the token endpoint
//! - Single-use authorization code issuance and consumption
//!
//! # Authorization Code Flow
//!
//! The flow is implemented across several submodules:
//!
//! - [`authorize`] - Request/response types for the authorization endpoint
//! - [`codes`] - The code ledger (issue, consume, revoke)
//! - [`service`] - Authorization service with validation logic
//! - [`client_auth`] - Client authentication at the token endpoint
//!
//! # Example
//!
//! ```ignore
//! use tokensmith_auth::oauth::{
//!     AuthorizationService, AuthorizationRequest, AuthorizationResponse,
//! };
//!
//! // Server processes authorization request
//! let service = AuthorizationService::new(client_storage, identity, codes);
//! let code = service.authorize(&request, authenticated_user).await?;
//!
//! // Build the JSON response
//! let response = AuthorizationResponse::new(
//!     code.code,
//!     request.state,
//!     code.expires_in_secs(),
//! );
//! ```

pub mod authorize;
pub mod client_auth;
pub mod codes;
pub mod service;

// Authorization endpoint types
pub use authorize::{AuthorizationRequest, AuthorizationResponse};

// Client authentication
pub use client_auth::{
    AuthenticatedClient, TokenEndpointAuthMethod, authenticate_client, parse_basic_auth,
};

// Code ledger
pub use codes::CodeLedger;

// Service types
pub use service::AuthorizationService;
