//! HTTP handlers for the OAuth 2.0 endpoints.
//!
//! This module provides Axum handlers wired to the grant-model services:
//!
//! - [`authorize`] - `GET /oauth/authorize` (authorization code issuance)
//! - [`token`] - `POST /token` (the three grant flows)
//! - [`authenticate`] - `GET /authenticate` (bearer introspection)
//!
//! Handlers take their collaborators through `Clone` state structs holding
//! `Arc`s, so one router can serve them all with a shared state or with
//! per-route substates.
//!
//! # Error Bodies
//!
//! Failures are rendered as RFC 6749 JSON
//! `{"error": "<code>", "error_description": "<text>"}` with the status
//! drawn from [`AuthError::http_status`]. Server-side failures are logged
//! and masked with a generic description.

pub mod authenticate;
pub mod authorize;
pub mod token;

pub use authenticate::{
    AuthenticateQuery, AuthenticateResponse, AuthenticateState, authenticate_handler,
};
pub use authorize::{AuthorizeState, authorize_handler};
pub use token::{TokenState, token_handler};

use axum::Json;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::error::AuthError;

/// RFC 6749 error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// OAuth 2.0 error code.
    pub error: &'static str,

    /// Human-readable error description.
    pub error_description: String,
}

/// Extracts a bearer token from the Authorization header.
#[must_use]
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Builds an RFC 6749 error response from a grant-model error.
///
/// Both authorization-code failure modes share one fixed description, so
/// the token endpoint never reveals whether a guessed code ever existed.
/// Server-side failures are logged here and the body carries a generic
/// description instead of internal detail.
#[must_use]
pub fn error_response(error: &AuthError) -> Response {
    let description = match error {
        AuthError::CodeNotFound | AuthError::CodeExpired => {
            "Authorization code is invalid or expired".to_string()
        }
        e if e.is_server_error() => {
            error!(error = %e, category = %e.category(), "Request failed");
            "Internal server error".to_string()
        }
        e => e.to_string(),
    };

    let status =
        StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        [
            ("Content-Type", "application/json"),
            ("Cache-Control", "no-store"),
            ("Pragma", "no-cache"),
        ],
        Json(ErrorBody {
            error: error.oauth_error_code(),
            error_description: description,
        }),
    )
        .into_response()
}
