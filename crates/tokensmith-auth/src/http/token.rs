//! OAuth 2.0 token endpoint handler.
//!
//! This module provides the HTTP handler for the token endpoint
//! (`POST /token`). It supports the following grant types:
//!
//! - `authorization_code` - Exchange an authorization code for tokens
//! - `refresh_token` - Refresh an access token
//! - `password` - Resource Owner Password Credentials
//!
//! # Example
//!
//! ```ignore
//! // Authorization code grant
//! POST /token
//! Content-Type: application/x-www-form-urlencoded
//! Authorization: Basic <base64(client_id:client_secret)>
//!
//! grant_type=authorization_code
//! &code=SplxlOBeZQQYbYS6WxSbIA
//! &redirect_uri=https://app.example.com/callback
//!
//! // Refresh token grant
//! POST /token
//! Content-Type: application/x-www-form-urlencoded
//!
//! grant_type=refresh_token
//! &refresh_token=tGzv3JOkF0XG5Qx2TlKWIA
//! &client_id=my-app
//! &client_secret=cs_...
//! ```

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::http::error_response;
use crate::oauth::client_auth::{AuthenticatedClient, authenticate_client, parse_basic_auth};
use crate::storage::ClientStorage;
use crate::token::service::TokenService;
use crate::token::types::{TokenRequest, TokenResponse};

/// State required for the token endpoint.
#[derive(Clone)]
pub struct TokenState {
    /// Service implementing the grant flows.
    pub token_service: Arc<TokenService>,

    /// Client storage for authenticating clients.
    pub client_storage: Arc<dyn ClientStorage>,
}

impl TokenState {
    /// Creates a new token state.
    #[must_use]
    pub fn new(token_service: Arc<TokenService>, client_storage: Arc<dyn ClientStorage>) -> Self {
        Self {
            token_service,
            client_storage,
        }
    }
}

/// OAuth 2.0 token endpoint handler.
///
/// Handles POST requests with an `application/x-www-form-urlencoded` body.
///
/// # Client Authentication
///
/// Every client is confidential; credentials arrive either as an HTTP
/// Basic Auth header or as `client_id`/`client_secret` body parameters,
/// with the header taking priority.
///
/// # Grant Types
///
/// - `authorization_code`: requires `code` and `redirect_uri`
/// - `refresh_token`: requires `refresh_token`
/// - `password`: requires `username` and `password`
///
/// Any other `grant_type` value is rejected with
/// `unsupported_grant_type`.
pub async fn token_handler(
    State(state): State<TokenState>,
    headers: HeaderMap,
    Form(request): Form<TokenRequest>,
) -> Response {
    debug!(
        grant_type = %request.grant_type,
        client_id = ?request.client_id,
        "Processing token request"
    );

    // Extract Basic auth credentials if present; the header wins over
    // body credentials
    let basic_auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic_auth);
    let basic_auth_ref = basic_auth
        .as_ref()
        .map(|(id, secret)| (id.as_str(), secret.as_str()));

    let AuthenticatedClient {
        client,
        auth_method,
    } = match authenticate_client(&request, basic_auth_ref, state.client_storage.as_ref()).await {
        Ok(authenticated) => authenticated,
        Err(e) => {
            warn!(error = %e, "Client authentication failed");
            return error_response(&e);
        }
    };

    debug!(
        client_id = %client.client_id,
        auth_method = %auth_method,
        grant_type = %request.grant_type,
        "Client authenticated, processing grant"
    );

    let result = match request.grant_type.as_str() {
        "authorization_code" => state.token_service.exchange_code(&request, &client).await,
        "refresh_token" => state.token_service.refresh(&request, &client).await,
        "password" => state.token_service.password(&request, &client).await,
        other => {
            warn!(grant_type = other, "Unsupported grant type");
            Err(AuthError::unsupported_grant_type(other))
        }
    };

    match result {
        Ok(response) => {
            info!(
                client_id = %client.client_id,
                grant_type = %request.grant_type,
                "Token issued"
            );
            token_success_response(response)
        }
        Err(e) => {
            warn!(
                client_id = %client.client_id,
                grant_type = %request.grant_type,
                error = %e,
                "Token request failed"
            );
            error_response(&e)
        }
    }
}

/// Builds a successful token response.
///
/// Token responses carry credentials and must not be cached by
/// intermediaries.
fn token_success_response(response: TokenResponse) -> Response {
    (
        StatusCode::OK,
        [
            ("Content-Type", "application/json"),
            ("Cache-Control", "no-store"),
            ("Pragma", "no-cache"),
        ],
        Json(response),
    )
        .into_response()
}
