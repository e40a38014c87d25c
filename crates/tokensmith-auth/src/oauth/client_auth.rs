//! Client authentication for the token endpoint.
//!
//! This module handles OAuth 2.0 client authentication at the token endpoint.
//! Every registered client is confidential; a secret is always required here.
//! The authorization endpoint, by contrast, looks clients up by id alone.
//!
//! # Authentication Methods
//!
//! - `client_secret_basic` - HTTP Basic Auth with client_id:client_secret
//! - `client_secret_post` - client_id and client_secret in request body
//!
//! # Authentication Priority
//!
//! When both methods are present, the HTTP Basic Auth header wins.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::ClientStorage;
use crate::token::types::TokenRequest;
use crate::types::Client;

/// Result of successful client authentication.
///
/// Contains the authenticated client and the method used for authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    /// The authenticated client.
    pub client: Client,

    /// The authentication method used.
    pub auth_method: TokenEndpointAuthMethod,
}

/// Token endpoint authentication methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEndpointAuthMethod {
    /// Client secret via HTTP Basic Auth.
    ClientSecretBasic,

    /// Client secret in request body.
    ClientSecretPost,
}

impl TokenEndpointAuthMethod {
    /// Returns the string representation of the auth method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientSecretBasic => "client_secret_basic",
            Self::ClientSecretPost => "client_secret_post",
        }
    }
}

impl fmt::Display for TokenEndpointAuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authenticates a client from a token request.
///
/// Tries authentication methods in priority order: HTTP Basic Auth first,
/// then body credentials.
///
/// # Arguments
///
/// * `request` - The token request containing client credentials
/// * `basic_auth` - Optional HTTP Basic Auth credentials (client_id, client_secret)
/// * `client_storage` - Storage for looking up client registrations
///
/// # Errors
///
/// Returns `InvalidClient` if:
/// - No client credentials are provided
/// - The client is not found
/// - The client is inactive
/// - The client secret is invalid
pub async fn authenticate_client(
    request: &TokenRequest,
    basic_auth: Option<(&str, &str)>,
    client_storage: &dyn ClientStorage,
) -> AuthResult<AuthenticatedClient> {
    // 1. Try HTTP Basic Auth first
    if let Some((client_id, client_secret)) = basic_auth {
        return authenticate_with_secret(
            client_id,
            client_secret,
            TokenEndpointAuthMethod::ClientSecretBasic,
            client_storage,
        )
        .await;
    }

    // 2. Try client_secret_post
    if let (Some(client_id), Some(client_secret)) = (&request.client_id, &request.client_secret) {
        return authenticate_with_secret(
            client_id,
            client_secret,
            TokenEndpointAuthMethod::ClientSecretPost,
            client_storage,
        )
        .await;
    }

    Err(AuthError::invalid_client("No client credentials provided"))
}

/// Authenticates a client with an id/secret pair.
///
/// # Errors
///
/// Returns `InvalidClient` if the client is unknown, inactive, or the
/// secret does not verify.
async fn authenticate_with_secret(
    client_id: &str,
    client_secret: &str,
    auth_method: TokenEndpointAuthMethod,
    client_storage: &dyn ClientStorage,
) -> AuthResult<AuthenticatedClient> {
    let client = client_storage
        .find_by_client_id(client_id)
        .await?
        .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;

    if !client.active {
        return Err(AuthError::invalid_client("Client is inactive"));
    }

    if !client_storage
        .verify_secret(client_id, client_secret)
        .await?
    {
        return Err(AuthError::invalid_client("Invalid client secret"));
    }

    Ok(AuthenticatedClient {
        client,
        auth_method,
    })
}

/// Parses an HTTP Basic Auth header value.
///
/// # Arguments
///
/// * `header_value` - The Authorization header value (e.g., "Basic dGVzdDoxMjM=")
///
/// # Returns
///
/// Returns `Some((client_id, client_secret))` if valid, `None` otherwise.
#[must_use]
pub fn parse_basic_auth(header_value: &str) -> Option<(String, String)> {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    let header_value = header_value.trim();

    // Must start with "Basic "
    if !header_value.starts_with("Basic ") {
        return None;
    }

    let encoded = &header_value[6..];
    let decoded = STANDARD.decode(encoded).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    // Split on first colon (secret may contain colons)
    let (client_id, client_secret) = credentials.split_once(':')?;

    Some((client_id.to_string(), client_secret.to_string()))
}
