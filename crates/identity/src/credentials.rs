//! Credential hashing (Argon2id, PHC strings).
//!
//! Plaintext secrets never leave this module; accounts only store the PHC
//! string returned by [`hash_secret`].

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("failed to hash secret: {0}")]
    Hash(String),

    #[error("stored credential is not a valid PHC string")]
    InvalidHashFormat,
}

pub fn hash_secret(secret: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

/// Check `secret` against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; only a corrupt stored hash is an error.
pub fn verify_secret(secret: &str, phc: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(phc).map_err(|_| CredentialError::InvalidHashFormat)?;
    match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredentialError::Hash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_secret() {
        let phc = hash_secret("correct horse").unwrap();
        assert!(phc.starts_with("$argon2"));
        assert!(verify_secret("correct horse", &phc).unwrap());
        assert!(!verify_secret("battery staple", &phc).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(hash_secret("same").unwrap(), hash_secret("same").unwrap());
    }

    #[test]
    fn corrupt_hash_is_reported() {
        assert_eq!(
            verify_secret("x", "plaintext"),
            Err(CredentialError::InvalidHashFormat)
        );
    }
}
