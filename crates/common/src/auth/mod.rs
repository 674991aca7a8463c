//! API key verification
//!
//! Scrape triggers are protected by a single shared secret. Keys are compared
//! by SHA-256 digest so the configured secret never sits next to the
//! presented value in a plain string comparison.

use crate::errors::{AppError, Result};
use sha2::{Digest, Sha256};

/// Hash an API key for comparison
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Validate an API key against a stored hash
pub fn validate_api_key(api_key: &str, stored_hash: &str) -> bool {
    hash_api_key(api_key) == stored_hash
}

/// Check the key presented in `header` against the configured secret.
///
/// A missing header is a malformed request (`MissingHeader`), a wrong key is
/// an authentication failure (`InvalidApiKey`).
pub fn verify_api_key(presented: Option<&str>, header: &str, expected: &str) -> Result<()> {
    let presented = presented.ok_or_else(|| AppError::MissingHeader {
        header: header.to_string(),
    })?;

    if validate_api_key(presented, &hash_api_key(expected)) {
        Ok(())
    } else {
        Err(AppError::InvalidApiKey)
    }
}
