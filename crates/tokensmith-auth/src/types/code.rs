//! Authorization code domain type.
//!
//! An authorization code is a short-lived, single-use credential minted at
//! the authorization endpoint and exchanged exactly once at the token
//! endpoint. Single use is enforced by the storage layer's atomic consume,
//! not by any field on this struct.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::types::token::generate_token;

/// Authorization code stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationCode {
    /// The opaque code value handed to the client.
    ///
    /// Codes are short-lived enough that storing them in the clear is
    /// acceptable; the row is deleted on first exchange.
    pub code: String,

    /// Client ID this code was issued to.
    pub client_id: String,

    /// User that authorized the request (None for client-only codes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,

    /// Redirect URI presented at the authorization endpoint.
    /// The token exchange must present the same value.
    pub redirect_uri: String,

    /// Negotiated scope (space-separated tokens; None means no scope
    /// was requested).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// When this code was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When this code expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl AuthorizationCode {
    /// Returns `true` if this code has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Remaining lifetime in whole seconds, zero once expired.
    #[must_use]
    pub fn expires_in_secs(&self) -> u64 {
        let remaining = self.expires_at - OffsetDateTime::now_utc();
        u64::try_from(remaining.whole_seconds()).unwrap_or(0)
    }

    /// Generate a cryptographically secure random code value.
    ///
    /// Returns a 256-bit random value encoded as base64url (43 characters).
    #[must_use]
    pub fn generate_code() -> String {
        generate_token()
    }
}
