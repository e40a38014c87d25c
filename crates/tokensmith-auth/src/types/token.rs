//! Access and refresh token domain types.
//!
//! Both token kinds are opaque: the value handed to the client carries no
//! structure, and validity is determined solely by store lookup.
//!
//! # Security
//!
//! - Tokens are stored as SHA-256 hashes, never plaintext
//! - The plaintext value is returned to the client exactly once, at issuance
//! - Revocation is deletion; a revoked token is indistinguishable from one
//!   that never existed

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Generate a cryptographically secure random token value.
///
/// Returns a 256-bit random value encoded as base64url (43 characters).
/// Used for access tokens, refresh tokens, and authorization codes.
#[must_use]
pub fn generate_token() -> String {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a token value using SHA-256.
///
/// This is used both when storing new tokens and when looking up
/// tokens for validation.
#[must_use]
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

// =============================================================================
// Access Token
// =============================================================================

/// Access token record stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// Unique identifier for this token record.
    pub id: Uuid,

    /// SHA-256 hash of the actual token value.
    /// The plaintext token is returned to the client but never stored.
    pub token_hash: String,

    /// Client ID that this token was issued to.
    pub client_id: String,

    /// User ID that authorized this token (None for client-only tokens).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,

    /// Granted scope (space-separated tokens; None means no scope granted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// When this token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When this token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl AccessToken {
    /// Returns `true` if this token has expired.
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
}

// =============================================================================
// Refresh Token
// =============================================================================

/// Refresh token record stored in the database.
///
/// Refresh tokens allow clients to obtain new access tokens without
/// requiring user re-authentication. An absent `expires_at` means the
/// token never expires, an explicit policy value rather than a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    /// Unique identifier for this token record.
    pub id: Uuid,

    /// SHA-256 hash of the actual token value.
    pub token_hash: String,

    /// Client ID that this token was issued to.
    pub client_id: String,

    /// User ID that authorized this token (None for client-only tokens).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,

    /// Granted scope (space-separated tokens; None means no scope granted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// When this token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When this token expires (None = no expiration).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expires_at: Option<OffsetDateTime>,
}

impl RefreshToken {
    /// Returns `true` if this token has expired.
    ///
    /// A token without `expires_at` never expires.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| OffsetDateTime::now_utc() > exp)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn test_hash_token() {
        let token = "test-token-value";
        let hash = hash_token(token);

        // SHA-256 produces 64 hex characters
        assert_eq!(hash.len(), 64);

        // Same input produces same hash
        assert_eq!(hash, hash_token(token));

        // Different input produces different hash
        assert_ne!(hash, hash_token("different-token"));
    }

    #[test]
    fn test_generate_token() {
        let token = generate_token();

        // 32 bytes base64url encoded = 43 characters
        assert_eq!(token.len(), 43);

        // Should be URL-safe base64
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_token_uniqueness() {
        let tokens: Vec<String> = (0..100).map(|_| generate_token()).collect();

        let mut unique = tokens.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(tokens.len(), unique.len());
    }

    #[test]
    fn test_access_token_is_expired() {
        let now = OffsetDateTime::now_utc();

        let token = make_access_token(now + Duration::hours(1));
        assert!(!token.is_expired());

        let token = make_access_token(now - Duration::minutes(1));
        assert!(token.is_expired());
    }

    #[test]
    fn test_access_token_expires_in() {
        let now = OffsetDateTime::now_utc();

        let token = make_access_token(now + Duration::hours(1));
        let secs = token.expires_in_secs();
        assert!(secs > 3500 && secs <= 3600);

        let token = make_access_token(now - Duration::minutes(1));
        assert_eq!(token.expires_in_secs(), 0);
    }

    #[test]
    fn test_refresh_token_is_expired() {
        let now = OffsetDateTime::now_utc();

        // Not expired (no expiration)
        let token = make_refresh_token(None);
        assert!(!token.is_expired());

        // Not expired (future expiration)
        let token = make_refresh_token(Some(now + Duration::hours(1)));
        assert!(!token.is_expired());

        // Expired
        let token = make_refresh_token(Some(now - Duration::minutes(1)));
        assert!(token.is_expired());
    }

    #[test]
    fn test_serialization() {
        let token = make_refresh_token(None);

        let json = serde_json::to_string(&token).unwrap();
        // Non-expiring tokens omit the field entirely
        assert!(!json.contains("expiresAt"));

        let deserialized: RefreshToken = serde_json::from_str(&json).unwrap();
        assert_eq!(token.id, deserialized.id);
        assert_eq!(token.token_hash, deserialized.token_hash);
        assert_eq!(token.client_id, deserialized.client_id);
        assert!(deserialized.expires_at.is_none());
    }

    fn make_access_token(expires_at: OffsetDateTime) -> AccessToken {
        AccessToken {
            id: Uuid::new_v4(),
            token_hash: hash_token("test-token"),
            client_id: "test-client".to_string(),
            user_id: Some(Uuid::new_v4()),
            scope: Some("read write".to_string()),
            created_at: OffsetDateTime::now_utc(),
            expires_at,
        }
    }

    fn make_refresh_token(expires_at: Option<OffsetDateTime>) -> RefreshToken {
        RefreshToken {
            id: Uuid::new_v4(),
            token_hash: hash_token("test-refresh"),
            client_id: "test-client".to_string(),
            user_id: Some(Uuid::new_v4()),
            scope: Some("read write".to_string()),
            created_at: OffsetDateTime::now_utc(),
            expires_at,
        }
    }
}
