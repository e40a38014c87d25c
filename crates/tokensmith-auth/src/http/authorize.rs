//! OAuth 2.0 authorization endpoint handler.
//!
//! Handles `GET /oauth/authorize` and returns the issued authorization
//! code as a JSON body rather than redirecting a browser. The caller
//! (typically a trusted front end) delivers the code to the client.
//!
//! If the request carries a bearer token, the code is bound to that
//! token's user unless the client has an owner, which always wins.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::http::{error_response, extract_bearer};
use crate::oauth::authorize::{AuthorizationRequest, AuthorizationResponse};
use crate::oauth::service::AuthorizationService;
use crate::token::service::TokenService;

/// State required for the authorization endpoint.
#[derive(Clone)]
pub struct AuthorizeState {
    /// Service implementing the authorization flow.
    pub authorization_service: Arc<AuthorizationService>,

    /// Token service used to resolve bearer tokens on the request.
    pub token_service: Arc<TokenService>,
}

impl AuthorizeState {
    /// Creates a new authorize state.
    #[must_use]
    pub fn new(
        authorization_service: Arc<AuthorizationService>,
        token_service: Arc<TokenService>,
    ) -> Self {
        Self {
            authorization_service,
            token_service,
        }
    }
}

/// OAuth 2.0 authorization endpoint handler.
///
/// Validates the client, response type, redirect URI and scope, then
/// issues a short-lived single-use authorization code. The `state`
/// parameter is echoed back verbatim when present.
///
/// A presented bearer token must be valid; an invalid or expired token
/// fails the request rather than falling back to a client-only code.
pub async fn authorize_handler(
    State(state): State<AuthorizeState>,
    headers: HeaderMap,
    Query(request): Query<AuthorizationRequest>,
) -> Response {
    debug!(
        client_id = %request.client_id,
        response_type = %request.response_type,
        "Processing authorization request"
    );

    let authenticated_user = match extract_bearer(&headers) {
        Some(token) => match state.token_service.verify_bearer(token, None).await {
            Ok(access) => access.user_id,
            Err(e) => {
                warn!(
                    client_id = %request.client_id,
                    error = %e,
                    "Bearer token on authorization request is invalid"
                );
                return error_response(&e);
            }
        },
        None => None,
    };

    match state
        .authorization_service
        .authorize(&request, authenticated_user)
        .await
    {
        Ok(code) => {
            let expires_in = code.expires_in_secs();
            let body = AuthorizationResponse::new(code.code, request.state.clone(), expires_in);
            // The code is a credential; keep it out of caches
            (
                StatusCode::OK,
                [
                    ("Content-Type", "application/json"),
                    ("Cache-Control", "no-store"),
                    ("Pragma", "no-cache"),
                ],
                Json(body),
            )
                .into_response()
        }
        Err(e) => {
            warn!(
                client_id = %request.client_id,
                error = %e,
                "Authorization request failed"
            );
            error_response(&e)
        }
    }
}
