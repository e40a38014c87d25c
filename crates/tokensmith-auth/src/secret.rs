//! Client secret generation and verification.
//!
//! This module provides cryptographically secure secret generation and
//! Argon2-based hashing for client authentication. The same hashing
//! primitives serve user passwords in storage backends.
//!
//! # Security
//!
//! - Secrets are 256-bit random values (32 bytes) with "cs_" prefix
//! - Hashing uses Argon2id (hybrid mode) with default parameters
//! - Salts are generated using OsRng (cryptographically secure RNG)
//! - Verification is constant-time by construction of the Argon2 verifier
//!
//! # Example
//!
//! ```
//! use tokensmith_auth::secret::{generate_client_secret, hash_secret, verify_secret};
//!
//! // Generate a new secret
//! let secret = generate_client_secret();
//! assert!(secret.starts_with("cs_"));
//!
//! // Hash for storage
//! let hash = hash_secret(&secret).unwrap();
//!
//! // Verify later
//! assert!(verify_secret(&secret, &hash).unwrap());
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;

/// Generate a new cryptographically secure client secret.
///
/// The secret is a 256-bit (32 bytes) random value encoded as hexadecimal
/// with a "cs_" prefix for easy identification.
///
/// # Format
///
/// `cs_{64 hex characters}` (67 characters total)
pub fn generate_client_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    format!("cs_{}", hex::encode(bytes))
}

/// Hash a secret or password for secure storage using Argon2id.
///
/// Uses Argon2id (hybrid mode) with:
/// - Cryptographically secure random salt (OsRng)
/// - Default parameters (memory cost, time cost, parallelism)
/// - PHC string format for storage
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
///
/// # Example
///
/// ```
/// use tokensmith_auth::secret::hash_secret;
///
/// let hash = hash_secret("my_secure_password").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_secret(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a secret or password against a stored Argon2 hash.
///
/// # Returns
///
/// `Ok(true)` if the secret matches the hash, `Ok(false)` if it doesn't
/// match. Returns `Err` only if the hash format is invalid.
///
/// # Example
///
/// ```
/// use tokensmith_auth::secret::{hash_secret, verify_secret};
///
/// let hash = hash_secret("correct horse").unwrap();
/// assert!(verify_secret("correct horse", &hash).unwrap());
/// assert!(!verify_secret("wrong horse", &hash).unwrap());
/// ```
pub fn verify_secret(secret: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(secret.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}
