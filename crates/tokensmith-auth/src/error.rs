//! Grant-model error types.
//!
//! This module defines all error types that can occur while issuing,
//! exchanging, refreshing, or verifying authorization codes and tokens.

use std::fmt;

/// Errors that can occur during grant-model operations.
///
/// Each variant carries enough detail for logging; the HTTP layer maps
/// variants to RFC 6749 error codes and status codes via
/// [`AuthError::oauth_error_code`] and [`AuthError::http_status`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The client credentials are invalid or the client is not registered.
    #[error("Invalid client: {message}")]
    InvalidClient {
        /// Description of why the client is invalid.
        message: String,
    },

    /// The request is malformed: redirect URI mismatch, missing required
    /// field, or a parameter that fails validation.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// The requested scope is invalid, unknown, or not grantable.
    #[error("Invalid scope: {message}")]
    InvalidScope {
        /// Description of why the scope is invalid.
        message: String,
    },

    /// No live authorization code exists for the presented value.
    ///
    /// Also returned when a code exists but belongs to a different client,
    /// so callers cannot probe for code ownership.
    #[error("Authorization code not found")]
    CodeNotFound,

    /// The authorization code existed but its expiry has passed.
    ///
    /// The stale row is deleted as a side effect of the lookup; surfaced
    /// to HTTP callers identically to [`AuthError::CodeNotFound`].
    #[error("Authorization code expired")]
    CodeExpired,

    /// No live access or refresh token exists for the presented value.
    #[error("Token not found")]
    TokenNotFound,

    /// The token existed but its expiry has passed.
    #[error("Token expired")]
    TokenExpired,

    /// The token is valid but does not carry the required scope.
    #[error("Insufficient scope: {message}")]
    InsufficientScope {
        /// Description of the missing scope.
        message: String,
    },

    /// The identity collaborator rejected the resource owner's credentials.
    #[error("Unauthenticated: {message}")]
    Unauthenticated {
        /// Description of why authentication failed.
        message: String,
    },

    /// The authorization server does not support the requested response type.
    #[error("Unsupported response type: {response_type}")]
    UnsupportedResponseType {
        /// The unsupported response type.
        response_type: String,
    },

    /// The authorization server does not support the requested grant type.
    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType {
        /// The unsupported grant type.
        grant_type: String,
    },

    /// An error occurred while storing or retrieving grant data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidClient` error.
    #[must_use]
    pub fn invalid_client(message: impl Into<String>) -> Self {
        Self::InvalidClient {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidScope` error.
    #[must_use]
    pub fn invalid_scope(message: impl Into<String>) -> Self {
        Self::InvalidScope {
            message: message.into(),
        }
    }

    /// Creates a new `InsufficientScope` error.
    #[must_use]
    pub fn insufficient_scope(message: impl Into<String>) -> Self {
        Self::InsufficientScope {
            message: message.into(),
        }
    }

    /// Creates a new `Unauthenticated` error.
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedResponseType` error.
    #[must_use]
    pub fn unsupported_response_type(response_type: impl Into<String>) -> Self {
        Self::UnsupportedResponseType {
            response_type: response_type.into(),
        }
    }

    /// Creates a new `UnsupportedGrantType` error.
    #[must_use]
    pub fn unsupported_grant_type(grant_type: impl Into<String>) -> Self {
        Self::UnsupportedGrantType {
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. }
        )
    }

    /// Returns `true` if this is a code-lifecycle error.
    #[must_use]
    pub fn is_code_error(&self) -> bool {
        matches!(self, Self::CodeNotFound | Self::CodeExpired)
    }

    /// Returns `true` if this is a token-lifecycle error.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(self, Self::TokenNotFound | Self::TokenExpired)
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidClient { .. } => ErrorCategory::Authentication,
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::InvalidScope { .. } => ErrorCategory::Validation,
            Self::CodeNotFound | Self::CodeExpired => ErrorCategory::Authentication,
            Self::TokenNotFound | Self::TokenExpired => ErrorCategory::Token,
            Self::InsufficientScope { .. } => ErrorCategory::Authorization,
            Self::Unauthenticated { .. } => ErrorCategory::Authentication,
            Self::UnsupportedResponseType { .. } => ErrorCategory::Validation,
            Self::UnsupportedGrantType { .. } => ErrorCategory::Validation,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    ///
    /// `CodeNotFound` and `CodeExpired` intentionally share a code (and the
    /// HTTP layer shares their description) so a caller probing the token
    /// endpoint cannot distinguish a guessed code from an expired one.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidClient { .. } => "invalid_client",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::InvalidScope { .. } => "invalid_scope",
            Self::CodeNotFound | Self::CodeExpired => "invalid_grant",
            Self::TokenNotFound | Self::TokenExpired => "invalid_token",
            Self::InsufficientScope { .. } => "insufficient_scope",
            Self::Unauthenticated { .. } => "access_denied",
            Self::UnsupportedResponseType { .. } => "unsupported_response_type",
            Self::UnsupportedGrantType { .. } => "unsupported_grant_type",
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. } => {
                "server_error"
            }
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidClient { .. } => 401,
            Self::InvalidRequest { .. } => 400,
            Self::InvalidScope { .. } => 400,
            Self::CodeNotFound | Self::CodeExpired => 400,
            Self::TokenNotFound | Self::TokenExpired => 401,
            Self::InsufficientScope { .. } => 403,
            Self::Unauthenticated { .. } => 401,
            Self::UnsupportedResponseType { .. } => 400,
            Self::UnsupportedGrantType { .. } => 400,
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. } => 500,
        }
    }
}

/// Categories of grant-model errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Authentication-related errors (client or resource-owner identity).
    Authentication,
    /// Authorization-related errors (scope checks).
    Authorization,
    /// Token-lifecycle errors (lookup, expiration).
    Token,
    /// Request validation errors.
    Validation,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Authorization => write!(f, "authorization"),
            Self::Token => write!(f, "token"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
