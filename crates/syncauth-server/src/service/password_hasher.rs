//! Password hashing and verification using Argon2id.

use std::sync::Arc;

use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
};
use rand::Rng;
use rand::rngs::OsRng;
use syncauth_core::{Error, ErrorKind, Result};

use crate::TRACING_TARGET_HASHER;

/// Memory cost in KiB (OWASP minimum for Argon2id).
const MEMORY_COST_KIB: u32 = 19_456;
/// Number of passes.
const TIME_COST: u32 = 2;
/// Degree of parallelism.
const PARALLELISM: u32 = 1;

/// Argon2id password hasher with fixed OWASP parameters.
///
/// Digests are PHC strings carrying the algorithm, parameters and salt, so
/// they can be stored as-is and verified without extra configuration.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_digest: Arc<str>,
}

impl PasswordHasher {
    /// Creates a new hasher and computes the digest used for unknown accounts.
    pub fn new() -> Result<Self> {
        let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_HASHER,
                error = %e,
                "Invalid Argon2 parameters"
            );
            Error::new(ErrorKind::HashingError).with_message("Invalid hashing parameters")
        })?;

        let mut hasher = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_digest: Arc::from(""),
        };

        let len = rand::random_range(16..32);
        let dummy: String = (0..len)
            .map(|_| rand::rng().sample(rand::distr::Alphanumeric) as char)
            .collect();
        hasher.dummy_digest = Arc::from(hasher.hash_password(&dummy)?);

        Ok(hasher)
    }

    /// Hashes a password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::try_from_rng(&mut OsRng).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_HASHER,
                error = %e,
                "Failed to generate password salt"
            );
            Error::new(ErrorKind::HashingError).with_message("Salt generation failed")
        })?;

        let digest = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET_HASHER,
                    error = %e,
                    "Password hashing failed"
                );
                Error::new(ErrorKind::HashingError).with_message("Password hashing failed")
            })?;

        Ok(digest.to_string())
    }

    /// Verifies a password against a stored digest.
    ///
    /// A wrong password yields [`ErrorKind::PasswordMismatch`]; an unreadable
    /// digest yields [`ErrorKind::HashingError`].
    pub fn verify_password(&self, password: &str, digest: &str) -> Result<()> {
        let parsed = PasswordHash::new(digest).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_HASHER,
                error = %e,
                "Stored password digest is malformed"
            );
            Error::new(ErrorKind::HashingError).with_message("Malformed password digest")
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(()),
            Err(ArgonError::Password) => Err(Error::new(ErrorKind::PasswordMismatch)),
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_HASHER,
                    error = %e,
                    "Password verification failed"
                );
                Err(Error::new(ErrorKind::HashingError).with_message("Password verification failed"))
            }
        }
    }

    /// Verifies `password` against a digest of a random password.
    ///
    /// Used when the account is unknown so that the response costs one
    /// verification, the same as a real mismatch. Always returns `false`.
    pub fn verify_dummy_password(&self, password: &str) -> bool {
        let _ = self.verify_password(password, &self.dummy_digest);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;
        let digest = hasher.hash_password("password123")?;

        assert!(digest.starts_with("$argon2id$"));
        hasher.verify_password("password123", &digest)?;
        Ok(())
    }

    #[test]
    fn salts_differ_per_call() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;
        let first = hasher.hash_password("password123")?;
        let second = hasher.hash_password("password123")?;

        assert_ne!(first, second);
        hasher.verify_password("password123", &second)?;
        Ok(())
    }

    #[test]
    fn wrong_password_is_mismatch() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;
        let digest = hasher.hash_password("password123")?;

        let error = hasher.verify_password("password124", &digest).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PasswordMismatch);
        Ok(())
    }

    #[test]
    fn malformed_digest_is_hashing_error() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;
        let error = hasher.verify_password("password123", "plaintext").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::HashingError);
        Ok(())
    }

    #[test]
    fn digests_carry_owasp_parameters() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;
        let digest = hasher.hash_password("password123")?;

        assert!(digest.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        Ok(())
    }

    #[test]
    fn dummy_verification_never_succeeds() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;
        assert!(!hasher.verify_dummy_password("password123"));
        assert!(!hasher.verify_dummy_password(""));
        Ok(())
    }

    #[test]
    fn dummy_digest_is_computed_once() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;
        let before = hasher.dummy_digest.clone();

        assert!(before.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        hasher.verify_dummy_password("password123");
        hasher.verify_dummy_password("password124");
        assert!(Arc::ptr_eq(&before, &hasher.dummy_digest));

        let cloned = hasher.clone();
        assert!(Arc::ptr_eq(&before, &cloned.dummy_digest));
        Ok(())
    }
}
