//! Grant-model configuration.
//!
//! This module provides configuration for code and token lifetimes and the
//! two policy switches of the grant model: refresh-token rotation and the
//! concurrent-session policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Grant-model configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// authorization_code_lifetime = "5m"
/// access_token_lifetime = "1h"
/// refresh_token_lifetime = "90d"
/// rotate_refresh_tokens = false
/// session_policy = "concurrent"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Authorization code lifetime.
    /// Codes should be short-lived for security.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Access token lifetime.
    /// Shorter lifetimes are more secure but require more frequent refresh.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    /// Absent means refresh tokens never expire.
    #[serde(default, with = "humantime_serde")]
    pub refresh_token_lifetime: Option<Duration>,

    /// Rotate refresh tokens on use.
    /// When enabled, each refresh revokes the presented refresh token and
    /// issues a replacement. When disabled the same refresh token remains
    /// valid for reuse.
    pub rotate_refresh_tokens: bool,

    /// Concurrent-session policy for user-bound token issuance.
    pub session_policy: SessionPolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(300), // 5 minutes
            access_token_lifetime: Duration::from_secs(3600),      // 1 hour
            refresh_token_lifetime: None,
            rotate_refresh_tokens: false,
            session_policy: SessionPolicy::Concurrent,
        }
    }
}

/// Policy for live tokens of the same client/user pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPolicy {
    /// Multiple live access/refresh tokens may coexist per client/user.
    Concurrent,
    /// Issuing new tokens for a client/user pair evicts that pair's
    /// existing tokens.
    Single,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::Concurrent
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any configured lifetime is
    /// zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.authorization_code_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "authorization_code_lifetime must be > 0".to_string(),
            ));
        }

        if self.access_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "access_token_lifetime must be > 0".to_string(),
            ));
        }

        if let Some(lifetime) = self.refresh_token_lifetime
            && lifetime.is_zero()
        {
            return Err(ConfigError::InvalidValue(
                "refresh_token_lifetime must be > 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}
