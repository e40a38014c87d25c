//! # tokensmith-auth
//!
//! OAuth 2.0 authorization server core for Tokensmith.
//!
//! This crate provides:
//! - OAuth 2.0 grant flows (authorization code, refresh token, password)
//! - Opaque token issuance, verification and rotation
//! - Single-use authorization codes
//! - Scope negotiation and enforcement
//! - Storage traits for auth-related data
//!
//! ## Overview
//!
//! Tokens are opaque random strings backed by storage; nothing is encoded
//! in the token itself. Every client is confidential and authenticates on
//! the token endpoint with a secret.
//!
//! ## Modules
//!
//! - [`config`] - Authorization server configuration
//! - [`error`] - Error taxonomy mapped to OAuth 2.0 wire errors
//! - [`oauth`] - Client authentication and the authorization flow
//! - [`token`] - Token issuance, verification and the grant flows
//! - [`scope`] - Space-delimited scope handling
//! - [`secret`] - Client secret generation and hashing
//! - [`identity`] - Resource owner credential verification trait
//! - [`storage`] - Storage traits for clients, codes and tokens
//! - [`http`] - Axum HTTP handlers for the OAuth endpoints

pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod oauth;
pub mod scope;
pub mod secret;
pub mod storage;
pub mod token;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{AuthConfig, ConfigError, SessionPolicy};
pub use error::{AuthError, ErrorCategory};
pub use http::{
    AuthenticateQuery, AuthenticateResponse, AuthenticateState, AuthorizeState, TokenState,
    authenticate_handler, authorize_handler, token_handler,
};
pub use identity::IdentityProvider;
pub use oauth::{
    AuthenticatedClient, AuthorizationRequest, AuthorizationResponse, AuthorizationService,
    CodeLedger, TokenEndpointAuthMethod, authenticate_client, parse_basic_auth,
};
pub use storage::{
    AccessTokenStorage, AuthorizationCodeStorage, ClientStorage, RefreshTokenStorage,
};
pub use token::{TokenLedger, TokenPair, TokenRequest, TokenResponse, TokenService};
pub use types::{
    AccessToken, AuthorizationCode, Client, ClientValidationError, GrantType, RefreshToken, User,
    UserRole,
};

/// Type alias for authentication/authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use tokensmith_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, ConfigError, SessionPolicy};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::http::{
        AuthenticateQuery, AuthenticateResponse, AuthenticateState, AuthorizeState, TokenState,
        authenticate_handler, authorize_handler, token_handler,
    };
    pub use crate::identity::IdentityProvider;
    pub use crate::oauth::{
        AuthenticatedClient, AuthorizationRequest, AuthorizationResponse, AuthorizationService,
        CodeLedger, TokenEndpointAuthMethod, authenticate_client, parse_basic_auth,
    };
    pub use crate::storage::{
        AccessTokenStorage, AuthorizationCodeStorage, ClientStorage, RefreshTokenStorage,
    };
    pub use crate::token::{TokenLedger, TokenPair, TokenRequest, TokenResponse, TokenService};
    pub use crate::types::{
        AccessToken, AuthorizationCode, Client, ClientValidationError, GrantType, RefreshToken,
        User, UserRole,
    };
}
