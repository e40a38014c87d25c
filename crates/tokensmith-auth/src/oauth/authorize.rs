//! Authorization endpoint types.
//!
//! This module provides the request and response types for the OAuth 2.0
//! authorization endpoint.
//!
//! # OAuth 2.0 Authorization Code Flow
//!
//! The authorization endpoint is the first step in the authorization code flow:
//!
//! 1. Client requests an authorization code with its request parameters
//! 2. Server validates the client, redirect URI, and requested scope
//! 3. Server returns a short-lived single-use code
//! 4. Client exchanges the code for tokens at the token endpoint
//!
//! The code is returned in the JSON response body rather than via a
//! redirect; driving a browser front channel is out of scope here.

use serde::{Deserialize, Serialize};

/// Authorization request parameters.
///
/// These parameters are received as query string parameters on the
/// authorization endpoint.
///
/// # Example
///
/// ```ignore
/// GET /oauth/authorize?
///   response_type=code
///   &client_id=my-app
///   &redirect_uri=https://app.example.com/callback
///   &scope=read write
///   &state=abc123xyz
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationRequest {
    /// Must be "code" for authorization code flow.
    pub response_type: String,

    /// Client identifier issued during registration.
    pub client_id: String,

    /// Redirect URI the code is bound to.
    /// Must exactly match one of the registered redirect URIs, and must be
    /// presented again unchanged at the token endpoint.
    pub redirect_uri: String,

    /// Requested scopes (space-separated, optional).
    /// When absent, the issued code carries no scope.
    #[serde(default)]
    pub scope: Option<String>,

    /// CSRF protection state parameter (optional).
    /// Echoed back verbatim in the response.
    #[serde(default)]
    pub state: Option<String>,
}

/// Authorization response body.
///
/// # Example
///
/// ```ignore
/// HTTP/1.1 200 OK
/// Content-Type: application/json
///
/// {"code":"SplxlOBeZQQYbYS6WxSbIA","state":"abc123xyz","expires_in":300}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationResponse {
    /// Authorization code to be exchanged for tokens.
    /// Single-use; expires after a short time (typically 5 minutes).
    pub code: String,

    /// Echoed state parameter for CSRF validation.
    /// The client must verify this matches the state sent in the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Seconds until the code expires.
    pub expires_in: u64,
}

impl AuthorizationResponse {
    /// Creates a new authorization response.
    #[must_use]
    pub fn new(code: String, state: Option<String>, expires_in: u64) -> Self {
        Self {
            code,
            state,
            expires_in,
        }
    }
}
