//! Token verification endpoint handler.
//!
//! Handles `GET /authenticate`: resolves the bearer token from the
//! `Authorization` header and returns who the token represents. Used by
//! resource servers and front ends to check a session without touching
//! token internals.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AuthError;
use crate::http::{error_response, extract_bearer};
use crate::identity::IdentityProvider;
use crate::token::service::TokenService;

/// State required for the authenticate endpoint.
#[derive(Clone)]
pub struct AuthenticateState {
    /// Token service used to resolve bearer tokens.
    pub token_service: Arc<TokenService>,

    /// Identity provider for resolving the token's user.
    pub identity: Arc<dyn IdentityProvider>,
}

impl AuthenticateState {
    /// Creates a new authenticate state.
    #[must_use]
    pub fn new(token_service: Arc<TokenService>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            token_service,
            identity,
        }
    }
}

/// Query parameters for the authenticate endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct AuthenticateQuery {
    /// Scope the token must satisfy, space-delimited. When present the
    /// token is additionally checked against it; scopeless tokens fail
    /// the check.
    pub scope: Option<String>,
}

/// Body returned for a valid bearer token.
///
/// `userId` and `username` are omitted for client-only tokens. A token
/// whose user no longer exists still reports its `userId`; only the
/// `username` lookup comes up empty.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateResponse {
    /// User the token is bound to, absent for client-only tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,

    /// Login name of that user, when the user still exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Client the token was issued to.
    pub client_id: String,

    /// Space-delimited scope granted to the token, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Remaining token lifetime in seconds.
    pub expires_in: u64,
}

/// Token verification endpoint handler.
///
/// Requires a `Bearer` token in the `Authorization` header. Unknown and
/// expired tokens both produce `401 invalid_token`; a token that does
/// not cover a requested `?scope=` produces `403 insufficient_scope`.
pub async fn authenticate_handler(
    State(state): State<AuthenticateState>,
    Query(query): Query<AuthenticateQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(token) = extract_bearer(&headers) else {
        return error_response(&AuthError::unauthenticated("Missing bearer token"));
    };

    let access = match state
        .token_service
        .verify_bearer(token, query.scope.as_deref())
        .await
    {
        Ok(access) => access,
        Err(e) => {
            debug!(error = %e, "Bearer token verification failed");
            return error_response(&e);
        }
    };

    let username = match access.user_id {
        Some(user_id) => match state.identity.find_user(user_id).await {
            Ok(user) => user.map(|u| u.email),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "User lookup failed");
                return error_response(&e);
            }
        },
        None => None,
    };

    let body = AuthenticateResponse {
        user_id: access.user_id,
        username,
        client_id: access.client_id.clone(),
        scope: access.scope.clone(),
        expires_in: access.expires_in_secs(),
    };

    debug!(
        client_id = %access.client_id,
        user_id = ?access.user_id,
        "Bearer token verified"
    );

    (StatusCode::OK, Json(body)).into_response()
}
